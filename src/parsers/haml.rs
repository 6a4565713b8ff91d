//! Haml parser: indentation determines nesting. A line's children are the
//! immediately following strictly-deeper lines, consumed recursively and
//! attached before the parent node is constructed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{Severity, Warning, WarningCollector};
use crate::errors::ParseError;
use crate::ir::{is_void_element, AttrMap, Conditional, Element, Loop, Node, Pos};
use crate::parsers::{opens_loop, split_conditional, split_loop};

const INDENT_UNIT: usize = 2;

/// `%tag` followed by `.class`/`#id` shorthand. What comes after (attribute
/// braces, a `=`/`==` payload, inline text) is scanned separately because
/// brace blocks nest.
static ELEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^%(?P<name>[A-Za-z][A-Za-z0-9-]*)(?P<shorthand>(?:[.#][A-Za-z0-9_-]+)*)")
        .expect("haml element pattern")
});

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a Haml document into a template tree.
pub fn parse(source: &str, warnings: &mut WarningCollector) -> Result<Node, ParseError> {
    let lines = collect_lines(source, warnings);
    let mut index = 0;
    let children = parse_level(&lines, &mut index, 0, warnings)?;
    Ok(Node::template(children))
}

// ============================================================================
// LINE SCANNING
// ============================================================================

struct Line<'s> {
    depth: usize,
    content: &'s str,
    number: usize,
}

fn collect_lines<'s>(source: &'s str, warnings: &mut WarningCollector) -> Vec<Line<'s>> {
    let mut lines = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let number = i + 1;
        let mut spaces = 0;
        for c in raw.chars() {
            match c {
                ' ' => spaces += 1,
                '\t' => {
                    warnings.add(
                        Warning::new(Severity::Warning, "tab indentation treated as one level")
                            .at_line(number),
                    );
                    spaces += INDENT_UNIT;
                }
                _ => break,
            }
        }
        if spaces % INDENT_UNIT != 0 {
            warnings.add(
                Warning::new(
                    Severity::Warning,
                    format!("odd indentation of {spaces} spaces rounded down"),
                )
                .at_line(number),
            );
        }
        lines.push(Line {
            depth: spaces / INDENT_UNIT,
            content: raw.trim(),
            number,
        });
    }
    lines
}

// ============================================================================
// RECURSIVE DESCENT OVER DEPTH
// ============================================================================

fn parse_level(
    lines: &[Line<'_>],
    index: &mut usize,
    depth: usize,
    warnings: &mut WarningCollector,
) -> Result<Vec<Node>, ParseError> {
    let mut nodes: Vec<Node> = Vec::new();

    while let Some(line) = lines.get(*index) {
        if line.depth < depth {
            break;
        }
        if line.depth > depth {
            // Deeper than expected with no parent to own it.
            warnings.add(
                Warning::new(Severity::Warning, "over-indented line treated as current level")
                    .at_line(line.number),
            );
        }
        *index += 1;
        let pos = Pos::new(line.number, line.depth * INDENT_UNIT + 1);

        // `- else` attaches to the previous conditional instead of opening
        // a node of its own.
        if code_content(line.content) == Some("else") {
            let else_children = parse_deeper(lines, index, depth, warnings)?;
            match nodes.last_mut() {
                Some(Node::Conditional(conditional)) if conditional.false_branch.is_empty() => {
                    conditional.false_branch = else_children;
                }
                _ => {
                    warnings.add(
                        Warning::new(Severity::Warning, "`- else` without a preceding conditional, skipped")
                            .at_line(line.number),
                    );
                }
            }
            continue;
        }

        let children = parse_deeper(lines, index, depth, warnings)?;
        if let Some(node) = parse_line(line.content, children, pos, warnings)? {
            nodes.push(node);
        }
    }

    Ok(nodes)
}

fn parse_deeper(
    lines: &[Line<'_>],
    index: &mut usize,
    depth: usize,
    warnings: &mut WarningCollector,
) -> Result<Vec<Node>, ParseError> {
    match lines.get(*index) {
        Some(next) if next.depth > depth => parse_level(lines, index, depth + 1, warnings),
        _ => Ok(Vec::new()),
    }
}

/// The code payload of a `- ...` line, or `None` for other line forms.
fn code_content(content: &str) -> Option<&str> {
    if content.starts_with("-#") {
        return None;
    }
    content.strip_prefix('-').map(str::trim)
}

// ============================================================================
// LINE CLASSIFICATION
// ============================================================================

fn parse_line(
    content: &str,
    children: Vec<Node>,
    pos: Pos,
    warnings: &mut WarningCollector,
) -> Result<Option<Node>, ParseError> {
    if let Some(text) = content.strip_prefix("-#") {
        drop_children(children, "silent comment", pos, warnings);
        return Ok(Some(Node::comment(text.trim(), false).at(pos)));
    }
    if content.starts_with('%') {
        return parse_element_line(content, children, pos, warnings);
    }
    if let Some(code) = code_content(content) {
        return Ok(Some(parse_code_line(code, children, pos, warnings)));
    }
    if let Some(code) = content.strip_prefix("==") {
        drop_children(children, "expression", pos, warnings);
        return Ok(Some(Node::expression(code.trim(), false).at(pos)));
    }
    if let Some(code) = content.strip_prefix('=') {
        drop_children(children, "expression", pos, warnings);
        return Ok(Some(Node::expression(code.trim(), true).at(pos)));
    }
    if let Some(text) = content.strip_prefix('/') {
        drop_children(children, "comment", pos, warnings);
        return Ok(Some(Node::comment(text.trim(), true).at(pos)));
    }
    drop_children(children, "plain text", pos, warnings);
    Ok(Some(Node::text(content).at(pos)))
}

fn drop_children(children: Vec<Node>, kind: &str, pos: Pos, warnings: &mut WarningCollector) {
    if !children.is_empty() {
        warnings.add(
            Warning::new(
                Severity::Info,
                format!("nested content under a {kind} line was dropped"),
            )
            .at_line(pos.line),
        );
    }
}

fn parse_code_line(
    code: &str,
    children: Vec<Node>,
    pos: Pos,
    warnings: &mut WarningCollector,
) -> Node {
    if let Some((keyword, condition)) = split_conditional(code) {
        if keyword != "if" {
            warnings.add(
                Warning::new(
                    Severity::Info,
                    format!("`{keyword}` condition translated as a plain `if`"),
                )
                .at_line(pos.line),
            );
        }
        return Node::Conditional(Conditional {
            condition: condition.to_string(),
            true_branch: children,
            false_branch: vec![],
            pos: Some(pos),
        });
    }
    if opens_loop(code) {
        let (collection, variable) = split_loop(code).unwrap_or_else(|| {
            warnings.add(
                Warning::new(
                    Severity::Warning,
                    "could not recover loop collection/variable, using placeholders",
                )
                .at_line(pos.line),
            );
            ("collection".to_string(), "item".to_string())
        });
        return Node::Loop(Loop {
            collection,
            variable,
            body: children,
            pos: Some(pos),
        });
    }
    Node::block(code, children).at(pos)
}

fn parse_element_line(
    content: &str,
    children: Vec<Node>,
    pos: Pos,
    warnings: &mut WarningCollector,
) -> Result<Option<Node>, ParseError> {
    let Some(caps) = ELEMENT_RE.captures(content) else {
        warnings.add(
            Warning::new(Severity::Warning, format!("unrecognized element line `{content}`, skipped"))
                .at_line(pos.line),
        );
        return Ok(None);
    };

    let name = caps.name("name").map(|m| m.as_str()).unwrap_or_default();
    let mut attributes = AttrMap::new();

    // `.name` appends to class, `#name` sets id.
    if let Some(shorthand) = caps.name("shorthand") {
        let mut classes: Vec<&str> = Vec::new();
        let mut rest = shorthand.as_str();
        while !rest.is_empty() {
            let marker = rest.as_bytes()[0];
            let token_end = rest[1..]
                .find(['.', '#'])
                .map(|i| i + 1)
                .unwrap_or(rest.len());
            let token = &rest[1..token_end];
            match marker {
                b'.' => classes.push(token),
                _ => attributes.insert("id", token),
            }
            rest = &rest[token_end..];
        }
        if !classes.is_empty() {
            attributes.insert("class", classes.join(" "));
        }
    }

    let matched = caps.get(0).map(|m| m.end()).unwrap_or(0);
    let mut rest = &content[matched..];
    if rest.starts_with('{') {
        match brace_block_end(rest) {
            Some(end) => {
                parse_attribute_braces(&rest[..end], &mut attributes, pos, warnings);
                rest = &rest[end..];
            }
            None => {
                warnings.add(
                    Warning::new(
                        Severity::Warning,
                        format!("unterminated attribute block on %{name}, skipped"),
                    )
                    .at_line(pos.line),
                );
                rest = "";
            }
        }
    }

    let mut all_children = Vec::new();
    if let Some(code) = rest.strip_prefix("==") {
        all_children.push(Node::expression(code.trim(), false).at(pos));
    } else if let Some(code) = rest.strip_prefix('=') {
        all_children.push(Node::expression(code.trim(), true).at(pos));
    } else {
        let inline = rest.trim();
        if !inline.is_empty() {
            all_children.push(Node::text(inline).at(pos));
        }
    }
    all_children.extend(children);

    let self_closing = is_void_element(name);
    if self_closing && !all_children.is_empty() {
        warnings.add(
            Warning::new(
                Severity::Warning,
                format!("void element %{name} cannot hold content, children dropped"),
            )
            .at_line(pos.line),
        );
        all_children.clear();
    }

    Ok(Some(Node::Element(Element {
        tag_name: name.to_string(),
        attributes,
        children: all_children,
        self_closing,
        pos: Some(pos),
    })))
}

/// Parses `{ key: "value", :key => "value" }` attribute blocks. Quoted
/// values are literal text; anything else is kept verbatim as opaque code.
fn parse_attribute_braces(
    block: &str,
    attributes: &mut AttrMap,
    pos: Pos,
    warnings: &mut WarningCollector,
) {
    let block = block.trim();
    let inner = block
        .strip_prefix('{')
        .and_then(|b| b.strip_suffix('}'))
        .unwrap_or(block)
        .trim();
    if inner.is_empty() {
        return;
    }
    for entry in split_top_level(inner) {
        let Some((key, value)) = split_attribute_entry(entry) else {
            warnings.add(
                Warning::new(
                    Severity::Warning,
                    format!("unparseable attribute entry `{entry}`, skipped"),
                )
                .at_line(pos.line),
            );
            continue;
        };
        attributes.insert(key, value);
    }
}

/// Byte offset one past the `}` matching the `{` at the start of `rest`,
/// counting nested braces and skipping quoted spans. `None` when the block
/// never closes.
fn brace_block_end(rest: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits on commas that are not inside quotes or brackets, so nested hash
/// values stay whole.
fn split_top_level(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '{') | (None, '[') | (None, '(') => depth += 1,
            (None, '}') | (None, ']') | (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(inner[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn split_attribute_entry(entry: &str) -> Option<(String, String)> {
    let (raw_key, raw_value) = if let Some(idx) = entry.find("=>") {
        (&entry[..idx], &entry[idx + 2..])
    } else {
        let idx = entry.find(':').filter(|&i| i > 0)?;
        (&entry[..idx], &entry[idx + 1..])
    };
    let key = raw_key
        .trim()
        .trim_start_matches(':')
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    if key.is_empty() {
        return None;
    }
    let value = raw_value.trim();
    let value = if (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
        || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
    {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    };
    Some((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::StaticContent;

    fn parse_ok(source: &str) -> Vec<Node> {
        let mut warnings = WarningCollector::new();
        match parse(source, &mut warnings).expect("parse should succeed") {
            Node::Template(t) => t.children,
            other => panic!("expected template root, got {}", other.kind()),
        }
    }

    #[test]
    fn indentation_scopes_children() {
        let children = parse_ok("%div\n  %p Hi");
        let Node::Element(div) = &children[0] else {
            panic!("expected element");
        };
        let Node::Element(p) = &div.children[0] else {
            panic!("expected nested element");
        };
        assert!(matches!(&p.children[0], Node::StaticContent(StaticContent { text, .. }) if text == "Hi"));
    }

    #[test]
    fn shorthand_classes_append_and_id_sets() {
        let children = parse_ok("%div.card.wide#main");
        let Node::Element(div) = &children[0] else {
            panic!("expected element");
        };
        assert_eq!(div.attributes.get("class"), Some("card wide"));
        assert_eq!(div.attributes.get("id"), Some("main"));
    }

    #[test]
    fn attribute_braces_take_literal_and_code_values() {
        let children = parse_ok("%div{ class: \"test\", data: @payload }");
        let Node::Element(div) = &children[0] else {
            panic!("expected element");
        };
        assert_eq!(div.attributes.get("class"), Some("test"));
        assert_eq!(div.attributes.get("data"), Some("@payload"));
    }

    #[test]
    fn line_prefixes_dispatch_node_kinds() {
        let children = parse_ok("= @name\n== raw\n- helper_call\n/ visible\n-# hidden\nplain");
        assert!(matches!(&children[0], Node::Expression(e) if e.escaped && e.code == "@name"));
        assert!(matches!(&children[1], Node::Expression(e) if !e.escaped && e.code == "raw"));
        assert!(matches!(&children[2], Node::Block(b) if b.code == "helper_call"));
        assert!(matches!(&children[3], Node::Comment(c) if c.html_visible && c.text == "visible"));
        assert!(matches!(&children[4], Node::Comment(c) if !c.html_visible && c.text == "hidden"));
        assert!(matches!(&children[5], Node::StaticContent(s) if s.text == "plain"));
    }

    #[test]
    fn conditional_with_else_fills_both_branches() {
        let children = parse_ok("- if @admin\n  %p yes\n- else\n  %p no");
        assert_eq!(children.len(), 1);
        let Node::Conditional(c) = &children[0] else {
            panic!("expected conditional");
        };
        assert_eq!(c.condition, "@admin");
        assert_eq!(c.true_branch.len(), 1);
        assert_eq!(c.false_branch.len(), 1);
    }

    #[test]
    fn each_line_becomes_a_loop() {
        let children = parse_ok("- @items.each do |item|\n  %li= item");
        let Node::Loop(l) = &children[0] else {
            panic!("expected loop");
        };
        assert_eq!(l.collection, "@items");
        assert_eq!(l.variable, "item");
        assert_eq!(l.body.len(), 1);
    }

    #[test]
    fn inline_expression_attaches_to_the_element() {
        let children = parse_ok("%li= item\n%li== raw_html");
        let Node::Element(first) = &children[0] else {
            panic!("expected element");
        };
        assert!(matches!(&first.children[0], Node::Expression(e) if e.escaped && e.code == "item"));
        let Node::Element(second) = &children[1] else {
            panic!("expected element");
        };
        assert!(
            matches!(&second.children[0], Node::Expression(e) if !e.escaped && e.code == "raw_html")
        );
    }

    #[test]
    fn attribute_braces_with_inline_expression() {
        let children = parse_ok("%span{ class: \"tag\" }= label");
        let Node::Element(span) = &children[0] else {
            panic!("expected element");
        };
        assert_eq!(span.attributes.get("class"), Some("tag"));
        assert!(matches!(&span.children[0], Node::Expression(e) if e.escaped && e.code == "label"));
    }

    #[test]
    fn nested_hash_attributes_close_at_the_matching_brace() {
        let children = parse_ok("%div{ data: { role: \"x\", level: 2 }, class: \"card\" } body");
        let Node::Element(div) = &children[0] else {
            panic!("expected element");
        };
        assert_eq!(div.attributes.get("data"), Some("{ role: \"x\", level: 2 }"));
        assert_eq!(div.attributes.get("class"), Some("card"));
        assert!(matches!(&div.children[0], Node::StaticContent(s) if s.text == "body"));
    }

    #[test]
    fn inline_text_precedes_nested_children() {
        let children = parse_ok("%p intro\n  %em deep");
        let Node::Element(p) = &children[0] else {
            panic!("expected element");
        };
        assert!(matches!(&p.children[0], Node::StaticContent(s) if s.text == "intro"));
        assert!(matches!(&p.children[1], Node::Element(em) if em.tag_name == "em"));
    }

    #[test]
    fn void_element_drops_children_with_warning() {
        let mut warnings = WarningCollector::new();
        let root = parse("%br\n  nested", &mut warnings).expect("parse");
        let Node::Template(t) = root else { unreachable!() };
        let Node::Element(br) = &t.children[0] else {
            panic!("expected element");
        };
        assert!(br.self_closing);
        assert!(br.children.is_empty());
        assert!(!warnings.is_empty());
    }
}
