//! ERB parser: a single scanner over the source text that interleaves markup
//! tags with `<% %>` code delimiters, followed by a tree builder that scopes
//! conditionals and loops.

use crate::diagnostics::{Severity, Warning, WarningCollector};
use crate::errors::ParseError;
use crate::ir::{is_void_element, AttrMap, Element, Node, Pos};
use crate::parsers::{opens_loop, split_conditional, split_loop};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses an ERB document into a template tree.
pub fn parse(source: &str, warnings: &mut WarningCollector) -> Result<Node, ParseError> {
    let tokens = tokenize(source)?;
    let mut builder = TreeBuilder {
        tokens: &tokens,
        index: 0,
        warnings,
    };
    let children = builder.parse_children(Stop::Document);
    Ok(Node::template(children))
}

// ============================================================================
// TOKENIZER
// ============================================================================

#[derive(Debug)]
enum Token {
    Static {
        text: String,
    },
    Output {
        code: String,
        escaped: bool,
        pos: Pos,
    },
    Code {
        code: String,
        pos: Pos,
    },
    ErbComment {
        text: String,
        pos: Pos,
    },
    HtmlComment {
        text: String,
        pos: Pos,
    },
    OpenTag {
        name: String,
        attributes: AttrMap,
        self_closing: bool,
        pos: Pos,
    },
    CloseTag {
        name: String,
        pos: Pos,
    },
}

fn pos_at(source: &str, index: usize) -> Pos {
    let before = &source[..index];
    let line = before.matches('\n').count() + 1;
    let column = index - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
    Pos { line, column }
}

fn push_static(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Token::Static { text: last }) = tokens.last_mut() {
        last.push_str(text);
    } else {
        tokens.push(Token::Static { text: text.into() });
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut at = 0;

    while at < source.len() {
        let Some(rel) = source[at..].find('<') else {
            push_static(&mut tokens, &source[at..]);
            break;
        };
        let start = at + rel;
        push_static(&mut tokens, &source[at..start]);
        let rest = &source[start..];
        let pos = pos_at(source, start);

        if let Some(after) = rest.strip_prefix("<%") {
            let Some(len) = after.find("%>") else {
                return Err(ParseError::at("Unclosed ERB tag", pos.line, pos.column));
            };
            let mut inner = &after[..len];
            // `-%>` whitespace-trim marker
            if inner.ends_with('-') {
                inner = &inner[..inner.len() - 1];
            }
            if let Some(code) = inner.strip_prefix("==") {
                tokens.push(Token::Output {
                    code: code.trim().into(),
                    escaped: false,
                    pos,
                });
            } else if let Some(code) = inner.strip_prefix('=') {
                tokens.push(Token::Output {
                    code: code.trim().into(),
                    escaped: true,
                    pos,
                });
            } else if let Some(text) = inner.strip_prefix('#') {
                tokens.push(Token::ErbComment {
                    text: text.trim().into(),
                    pos,
                });
            } else {
                // `<%-` whitespace-trim marker
                let code = inner.strip_prefix('-').unwrap_or(inner).trim();
                if !code.is_empty() {
                    tokens.push(Token::Code {
                        code: code.into(),
                        pos,
                    });
                }
            }
            at = start + 2 + len + 2;
        } else if let Some(after) = rest.strip_prefix("<!--") {
            let Some(len) = after.find("-->") else {
                return Err(ParseError::at("Unclosed HTML comment", pos.line, pos.column));
            };
            tokens.push(Token::HtmlComment {
                text: after[..len].trim().into(),
                pos,
            });
            at = start + 4 + len + 3;
        } else if rest.starts_with("<!") {
            // Doctype and friends pass through as literal text.
            match rest.find('>') {
                Some(len) => {
                    push_static(&mut tokens, &rest[..=len]);
                    at = start + len + 1;
                }
                None => {
                    push_static(&mut tokens, rest);
                    break;
                }
            }
        } else if let Some(after) = rest.strip_prefix("</") {
            let name: String = after
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            let close = after.find('>');
            match (name.is_empty(), close) {
                (false, Some(len)) => {
                    tokens.push(Token::CloseTag { name, pos });
                    at = start + 2 + len + 1;
                }
                _ => {
                    push_static(&mut tokens, "<");
                    at = start + 1;
                }
            }
        } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            match scan_open_tag(source, start)? {
                Some((token, next)) => {
                    tokens.push(token);
                    at = next;
                }
                None => {
                    push_static(&mut tokens, "<");
                    at = start + 1;
                }
            }
        } else {
            push_static(&mut tokens, "<");
            at = start + 1;
        }
    }

    Ok(tokens)
}

/// Scans `<name attr="value" ...>` starting at the `<`. Returns `None` when
/// the text turns out not to be a tag after all, so the `<` falls back to
/// literal content. Attribute values are copied verbatim, ERB included.
fn scan_open_tag(source: &str, start: usize) -> Result<Option<(Token, usize)>, ParseError> {
    let pos = pos_at(source, start);
    let bytes = source.as_bytes();
    let mut i = start + 1;
    let name_start = i;
    while i < source.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    let name = source[name_start..i].to_ascii_lowercase();
    if name.is_empty() {
        return Ok(None);
    }

    let mut attributes = AttrMap::new();
    let mut self_closing = false;
    loop {
        while i < source.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= source.len() {
            return Err(ParseError::at(
                format!("Unclosed tag <{name}"),
                pos.line,
                pos.column,
            ));
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' if source[i..].starts_with("/>") => {
                self_closing = true;
                i += 2;
                break;
            }
            _ => {
                let key_start = i;
                while i < source.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'=' | b'>' | b'/')
                {
                    i += 1;
                }
                let key = &source[key_start..i];
                if key.is_empty() {
                    // Something like `< div`; not a tag we understand.
                    return Ok(None);
                }
                let mut value = String::new();
                if i < source.len() && bytes[i] == b'=' {
                    i += 1;
                    if i < source.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                        let quote = bytes[i];
                        i += 1;
                        let value_start = i;
                        while i < source.len() && bytes[i] != quote {
                            i += 1;
                        }
                        if i >= source.len() {
                            return Err(ParseError::at(
                                format!("Unclosed attribute value in <{name}"),
                                pos.line,
                                pos.column,
                            ));
                        }
                        value = source[value_start..i].to_string();
                        i += 1;
                    } else {
                        let value_start = i;
                        while i < source.len()
                            && !bytes[i].is_ascii_whitespace()
                            && !matches!(bytes[i], b'>' | b'/')
                        {
                            i += 1;
                        }
                        value = source[value_start..i].to_string();
                    }
                }
                attributes.insert(key, value);
            }
        }
    }

    let self_closing = self_closing || is_void_element(&name);
    Ok(Some((
        Token::OpenTag {
            name,
            attributes,
            self_closing,
            pos,
        },
        i,
    )))
}

// ============================================================================
// TREE BUILDER
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum Stop<'t> {
    /// Runs to the end of the token stream.
    Document,
    /// Stops before `</name>`.
    CloseTag(&'t str),
    /// Stops before a bare `end` or `else` code token.
    BlockEnd,
    /// Stops before a bare `end` code token only.
    BlockEndOnly,
}

struct TreeBuilder<'a, 't> {
    tokens: &'t [Token],
    index: usize,
    warnings: &'a mut WarningCollector,
}

impl<'t> TreeBuilder<'_, 't> {
    fn parse_children(&mut self, stop: Stop<'t>) -> Vec<Node> {
        let mut children = Vec::new();

        while let Some(token) = self.tokens.get(self.index) {
            if Self::stops_at(stop, token) {
                return children;
            }
            self.index += 1;
            match token {
                Token::Static { text } => children.push(Node::text(text.clone())),
                Token::Output { code, escaped, pos } => {
                    children.push(Node::expression(code.clone(), *escaped).at(*pos));
                }
                Token::ErbComment { text, pos } => {
                    children.push(Node::comment(text.clone(), false).at(*pos));
                }
                Token::HtmlComment { text, pos } => {
                    children.push(Node::comment(text.clone(), true).at(*pos));
                }
                Token::CloseTag { name, pos } => {
                    self.warnings.add(
                        Warning::new(
                            Severity::Warning,
                            format!("unexpected closing tag </{name}>, skipped"),
                        )
                        .at_line(pos.line),
                    );
                }
                Token::OpenTag {
                    name,
                    attributes,
                    self_closing,
                    pos,
                } => {
                    let node = if *self_closing {
                        Node::Element(Element {
                            tag_name: name.clone(),
                            attributes: attributes.clone(),
                            children: vec![],
                            self_closing: true,
                            pos: Some(*pos),
                        })
                    } else {
                        self.parse_element(name, attributes.clone(), *pos)
                    };
                    children.push(node);
                }
                Token::Code { code, pos } => {
                    let trimmed = code.trim();
                    if trimmed == "end" || trimmed == "else" {
                        self.warnings.add(
                            Warning::new(
                                Severity::Warning,
                                format!("stray `{trimmed}` outside any open scope, skipped"),
                            )
                            .at_line(pos.line),
                        );
                    } else if split_conditional(trimmed).is_some() {
                        children.push(self.parse_conditional(trimmed, *pos));
                    } else if opens_loop(trimmed) {
                        children.push(self.parse_loop(trimmed, *pos));
                    } else {
                        children.push(Node::block(trimmed, vec![]).at(*pos));
                    }
                }
            }
        }

        match stop {
            Stop::Document => {}
            Stop::CloseTag(name) => {
                self.warnings
                    .warn(format!("unclosed <{name}> tag, recovered at end of input"));
            }
            Stop::BlockEnd | Stop::BlockEndOnly => {
                self.warnings
                    .warn("missing <% end %>, recovered at end of input");
            }
        }
        children
    }

    fn stops_at(stop: Stop<'t>, token: &Token) -> bool {
        match (stop, token) {
            (Stop::CloseTag(expected), Token::CloseTag { name, .. }) => name == expected,
            // Scope closing matches `end` by literal text equality, not by a
            // nesting counter: an inner block whose own `end` arrives first
            // will close this scope early.
            (Stop::BlockEnd, Token::Code { code, .. }) => {
                matches!(code.trim(), "end" | "else")
            }
            (Stop::BlockEndOnly, Token::Code { code, .. }) => code.trim() == "end",
            _ => false,
        }
    }

    fn parse_element(&mut self, name: &'t str, attributes: AttrMap, pos: Pos) -> Node {
        let children = self.parse_children(Stop::CloseTag(name));
        // Consume the matching close tag if it is what stopped us.
        if let Some(Token::CloseTag { name: n, .. }) = self.tokens.get(self.index) {
            if n == name {
                self.index += 1;
            }
        }
        Node::Element(Element {
            tag_name: name.to_string(),
            attributes,
            children,
            self_closing: false,
            pos: Some(pos),
        })
    }

    fn parse_conditional(&mut self, code: &str, pos: Pos) -> Node {
        let (keyword, condition) = split_conditional(code).unwrap_or(("if", code));
        if keyword != "if" {
            self.warnings.add(
                Warning::new(
                    Severity::Info,
                    format!("`{keyword}` condition translated as a plain `if`"),
                )
                .at_line(pos.line),
            );
        }

        let true_branch = self.parse_children(Stop::BlockEnd);
        let mut false_branch = Vec::new();
        if self.next_code_is("else") {
            self.index += 1;
            false_branch = self.parse_children(Stop::BlockEndOnly);
        }
        if self.next_code_is("end") {
            self.index += 1;
        }

        Node::Conditional(crate::ir::Conditional {
            condition: condition.to_string(),
            true_branch,
            false_branch,
            pos: Some(pos),
        })
    }

    fn parse_loop(&mut self, code: &str, pos: Pos) -> Node {
        let (collection, variable) = if let Some(rest) = code.strip_prefix("while ") {
            self.warnings.add(
                Warning::new(Severity::Info, "`while` loop approximated as iteration")
                    .at_line(pos.line),
            );
            (rest.trim().to_string(), "item".to_string())
        } else {
            split_loop(code).unwrap_or_else(|| {
                self.warnings.add(
                    Warning::new(
                        Severity::Warning,
                        "could not recover loop collection/variable, using placeholders",
                    )
                    .at_line(pos.line),
                );
                ("collection".to_string(), "item".to_string())
            })
        };

        let body = self.parse_children(Stop::BlockEndOnly);
        if self.next_code_is("end") {
            self.index += 1;
        }

        Node::Loop(crate::ir::Loop {
            collection,
            variable,
            body,
            pos: Some(pos),
        })
    }

    fn next_code_is(&self, keyword: &str) -> bool {
        matches!(
            self.tokens.get(self.index),
            Some(Token::Code { code, .. }) if code.trim() == keyword
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Conditional, Expression, Loop, StaticContent};

    fn parse_ok(source: &str) -> Vec<Node> {
        let mut warnings = WarningCollector::new();
        match parse(source, &mut warnings).expect("parse should succeed") {
            Node::Template(t) => t.children,
            other => panic!("expected template root, got {}", other.kind()),
        }
    }

    #[test]
    fn output_tags_classify_by_leading_equals() {
        let children = parse_ok("<%= name %><%== raw_html %>");
        assert!(
            matches!(&children[0], Node::Expression(Expression { code, escaped: true, .. }) if code == "name")
        );
        assert!(
            matches!(&children[1], Node::Expression(Expression { code, escaped: false, .. }) if code == "raw_html")
        );
    }

    #[test]
    fn erb_comment_is_source_only() {
        let children = parse_ok("<%# hidden %>");
        assert!(
            matches!(&children[0], Node::Comment(c) if c.text == "hidden" && !c.html_visible)
        );
    }

    #[test]
    fn elements_nest_with_attributes() {
        let children = parse_ok("<div class=\"test\"><p>Hi</p></div>");
        let Node::Element(div) = &children[0] else {
            panic!("expected element");
        };
        assert_eq!(div.tag_name, "div");
        assert_eq!(div.attributes.get("class"), Some("test"));
        let Node::Element(p) = &div.children[0] else {
            panic!("expected nested element");
        };
        assert!(matches!(&p.children[0], Node::StaticContent(StaticContent { text, .. }) if text == "Hi"));
    }

    #[test]
    fn void_tags_are_self_closing_without_children() {
        let children = parse_ok("<br><img src=\"x.png\" />");
        for child in &children {
            let Node::Element(el) = child else {
                panic!("expected element");
            };
            assert!(el.self_closing);
            assert!(el.children.is_empty());
        }
    }

    #[test]
    fn conditional_scope_closes_on_end() {
        let children = parse_ok("<% if @admin %>yes<% else %>no<% end %>after");
        let Node::Conditional(Conditional {
            condition,
            true_branch,
            false_branch,
            ..
        }) = &children[0]
        else {
            panic!("expected conditional");
        };
        assert_eq!(condition, "@admin");
        assert!(matches!(&true_branch[0], Node::StaticContent(s) if s.text == "yes"));
        assert!(matches!(&false_branch[0], Node::StaticContent(s) if s.text == "no"));
        assert!(matches!(&children[1], Node::StaticContent(s) if s.text == "after"));
    }

    #[test]
    fn each_loop_recovers_collection_and_variable() {
        let children = parse_ok("<% @items.each do |item| %><li><%= item %></li><% end %>");
        let Node::Loop(Loop {
            collection,
            variable,
            body,
            ..
        }) = &children[0]
        else {
            panic!("expected loop");
        };
        assert_eq!(collection, "@items");
        assert_eq!(variable, "item");
        assert!(matches!(&body[0], Node::Element(el) if el.tag_name == "li"));
    }

    #[test]
    fn unclosed_erb_tag_is_fatal() {
        let mut warnings = WarningCollector::new();
        let err = parse("<div><%= name", &mut warnings).unwrap_err();
        assert!(err.to_string().contains("Unclosed ERB tag"));
    }

    #[test]
    fn unclosed_element_recovers_with_warning() {
        let mut warnings = WarningCollector::new();
        let root = parse("<div>text", &mut warnings).expect("recoverable");
        let Node::Template(t) = root else { unreachable!() };
        assert!(matches!(&t.children[0], Node::Element(el) if el.tag_name == "div"));
        assert!(!warnings.is_empty());
    }

    #[test]
    fn literal_angle_bracket_stays_text() {
        let children = parse_ok("1 < 2");
        assert_eq!(children.len(), 1);
        assert!(matches!(&children[0], Node::StaticContent(s) if s.text == "1 < 2"));
    }
}
