//! Phlex parser. The [`ruby`] module reads the component source into a small
//! Ruby AST; this module finds the `view_template` method and lowers its body
//! into the shared IR. Helper calls the lowering does not recognize are
//! dropped with a warning rather than failing the parse.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::diagnostics::WarningCollector;
use crate::errors::ParseError;
use crate::ir::{is_void_element, AttrMap, Conditional, Element, Loop, Node};

mod ruby;

use ruby::{unparse, RubyNode};

/// Element methods Phlex components can call.
static HTML_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "abbr", "address", "article", "aside", "audio", "b", "bdi", "bdo", "blockquote",
        "body", "br", "button", "canvas", "caption", "cite", "code", "col", "colgroup", "data",
        "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt", "em", "embed",
        "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
        "head", "header", "hr", "html", "i", "iframe", "img", "input", "ins", "kbd", "label",
        "legend", "li", "link", "main", "map", "mark", "meta", "meter", "nav", "noscript",
        "object", "ol", "optgroup", "option", "output", "p", "param", "picture", "pre",
        "progress", "q", "rp", "rt", "ruby", "s", "samp", "script", "section", "select", "small",
        "source", "span", "strong", "style", "sub", "summary", "sup", "table", "tbody", "td",
        "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr", "track", "u", "ul",
        "var", "video", "wbr",
    ]
    .into_iter()
    .collect()
});

fn is_html_element(name: &str) -> bool {
    HTML_ELEMENTS.contains(name)
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a Phlex component into a template tree.
pub fn parse(source: &str, warnings: &mut WarningCollector) -> Result<Node, ParseError> {
    let program = ruby::parse_program(source)?;
    let body = find_view_template(&program).ok_or_else(|| {
        ParseError::new("No view_template method found in Phlex component")
    })?;
    let children = lower_body(body, warnings);
    Ok(Node::template(children))
}

fn find_view_template(nodes: &[RubyNode]) -> Option<&[RubyNode]> {
    for node in nodes {
        match node {
            RubyNode::Def { name, body } if name == "view_template" => return Some(body),
            RubyNode::Class { body, .. } | RubyNode::Def { body, .. } => {
                if let Some(found) = find_view_template(body) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

// ============================================================================
// LOWERING
// ============================================================================

fn lower_body(nodes: &[RubyNode], warnings: &mut WarningCollector) -> Vec<Node> {
    nodes
        .iter()
        .filter_map(|node| lower(node, warnings))
        .collect()
}

fn lower(node: &RubyNode, warnings: &mut WarningCollector) -> Option<Node> {
    match node {
        RubyNode::Block { call, params, body } => lower_block(call, params, body, warnings),
        RubyNode::Send {
            receiver,
            method,
            args,
        } => lower_send(receiver.as_deref(), method, args, warnings),
        RubyNode::Str(text) => Some(Node::text(text.clone())),
        // A bare element method with no arguments lexes as a variable.
        RubyNode::Lvar(name) if is_html_element(name) => Some(Node::Element(Element {
            tag_name: name.clone(),
            attributes: AttrMap::new(),
            children: vec![],
            self_closing: is_void_element(name),
            pos: None,
        })),
        RubyNode::Lvar(name) => Some(Node::expression(name.clone(), true)),
        RubyNode::Ivar(name) => Some(Node::expression(format!("@{name}"), true)),
        RubyNode::If {
            condition,
            then_branch,
            else_branch,
        } => Some(Node::Conditional(Conditional {
            condition: unparse(condition),
            true_branch: lower_body(then_branch, warnings),
            false_branch: lower_body(else_branch, warnings),
            pos: None,
        })),
        RubyNode::Raw(text) => {
            warnings.info(format!("kept unrecognized statement `{text}` as opaque code"));
            Some(Node::block(text.clone(), vec![]))
        }
        other => {
            warnings.warn(format!(
                "unsupported construct `{}` in view_template, skipped",
                unparse(other)
            ));
            None
        }
    }
}

fn lower_block(
    call: &RubyNode,
    params: &[String],
    body: &[RubyNode],
    warnings: &mut WarningCollector,
) -> Option<Node> {
    let RubyNode::Send {
        receiver,
        method,
        args,
    } = call
    else {
        warnings.warn("block attached to a non-call, skipped");
        return None;
    };

    if receiver.is_none() && is_html_element(method) {
        return Some(Node::Element(Element {
            tag_name: method.clone(),
            attributes: extract_attributes(args),
            children: lower_body(body, warnings),
            self_closing: false,
            pos: None,
        }));
    }

    if method == "each" {
        let collection = receiver.as_deref().map(unparse).unwrap_or_default();
        let variable = params
            .first()
            .cloned()
            .unwrap_or_else(|| "item".to_string());
        return Some(Node::Loop(Loop {
            collection,
            variable,
            body: lower_body(body, warnings),
            pos: None,
        }));
    }

    if receiver.is_none() && method == "comment" {
        let text = match body.first() {
            Some(RubyNode::Str(text)) => text.clone(),
            _ => String::new(),
        };
        return Some(Node::comment(text, true));
    }

    Some(Node::block(unparse(call), lower_body(body, warnings)))
}

fn lower_send(
    receiver: Option<&RubyNode>,
    method: &str,
    args: &[RubyNode],
    warnings: &mut WarningCollector,
) -> Option<Node> {
    if receiver.is_some() {
        warnings.warn(format!(
            "helper call `{}` has no markup equivalent, skipped",
            unparse(&RubyNode::Send {
                receiver: receiver.map(|r| Box::new(r.clone())),
                method: method.to_string(),
                args: args.to_vec(),
            })
        ));
        return None;
    }

    match method {
        "plain" | "text" => match args.first() {
            Some(RubyNode::Str(text)) => Some(Node::text(text.clone())),
            Some(arg) => Some(Node::expression(unparse(arg), true)),
            None => None,
        },
        "raw" => match args.first() {
            Some(RubyNode::Str(text)) => Some(Node::expression(text.clone(), false)),
            Some(arg) => Some(Node::expression(unparse(arg), false)),
            None => None,
        },
        "comment" => {
            let text = match args.first() {
                Some(RubyNode::Str(text)) => text.clone(),
                _ => String::new(),
            };
            Some(Node::comment(text, true))
        }
        "render" => {
            let target = args.first().map(unparse).unwrap_or_default();
            warnings.warn(format!(
                "`render {target}` has no markup equivalent, skipped"
            ));
            None
        }
        name if is_html_element(name) => Some(Node::Element(Element {
            tag_name: name.to_string(),
            attributes: extract_attributes(args),
            children: vec![],
            self_closing: is_void_element(name),
            pos: None,
        })),
        other => {
            warnings.warn(format!(
                "helper call `{other}` has no markup equivalent, skipped"
            ));
            None
        }
    }
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

fn extract_attributes(args: &[RubyNode]) -> AttrMap {
    let mut attributes = AttrMap::new();
    for arg in args {
        match arg {
            RubyNode::Hash(pairs) => {
                for (key, value) in pairs {
                    let Some(key) = hash_key(key) else { continue };
                    attributes.insert(key, hash_value(value));
                }
            }
            // `div "card"` is class shorthand.
            RubyNode::Str(text) => attributes.insert("class", text.clone()),
            _ => {}
        }
    }
    attributes
}

fn hash_key(node: &RubyNode) -> Option<String> {
    match node {
        RubyNode::Sym(name) => Some(name.clone()),
        RubyNode::Str(text) => Some(text.clone()),
        _ => None,
    }
}

/// String and scalar values become literal text; everything else stays as
/// code via the unparser.
fn hash_value(node: &RubyNode) -> String {
    match node {
        RubyNode::Str(text) => text.clone(),
        RubyNode::Sym(name) => name.clone(),
        RubyNode::True => "true".to_string(),
        RubyNode::False => "false".to_string(),
        RubyNode::Nil => "nil".to_string(),
        other => unparse(other),
    }
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

    const CARD: &str = "class Card < Phlex::HTML\n  def view_template\n    div(class: \"card\") do\n      h1 { \"Title\" }\n    end\n  end\nend";

    #[test]
    fn element_blocks_nest_with_attributes() {
        let children = parse_ok(CARD);
        let Node::Element(div) = &children[0] else {
            panic!("expected element");
        };
        assert_eq!(div.tag_name, "div");
        assert_eq!(div.attributes.get("class"), Some("card"));
        let Node::Element(h1) = &div.children[0] else {
            panic!("expected nested element");
        };
        assert!(matches!(&h1.children[0], Node::StaticContent(StaticContent { text, .. }) if text == "Title"));
    }

    #[test]
    fn missing_view_template_is_fatal() {
        let mut warnings = WarningCollector::new();
        let err = parse("class Card\n  def other\n  end\nend", &mut warnings)
            .expect_err("should fail");
        assert!(err.message.contains("view_template"));
    }

    #[test]
    fn plain_text_raw_and_comment_calls() {
        let source = "def view_template\n  plain \"a\"\n  text @name\n  raw \"<b>x</b>\"\n  comment \"note\"\nend";
        let children = parse_ok(source);
        assert!(matches!(&children[0], Node::StaticContent(s) if s.text == "a"));
        assert!(matches!(&children[1], Node::Expression(e) if e.escaped && e.code == "@name"));
        assert!(matches!(&children[2], Node::Expression(e) if !e.escaped && e.code == "<b>x</b>"));
        assert!(matches!(&children[3], Node::Comment(c) if c.html_visible && c.text == "note"));
    }

    #[test]
    fn each_block_lowers_to_a_loop() {
        let source = "def view_template\n  @items.each do |item|\n    li { item }\n  end\nend";
        let children = parse_ok(source);
        let Node::Loop(l) = &children[0] else {
            panic!("expected loop");
        };
        assert_eq!(l.collection, "@items");
        assert_eq!(l.variable, "item");
        let Node::Element(li) = &l.body[0] else {
            panic!("expected element body");
        };
        assert!(matches!(&li.children[0], Node::Expression(e) if e.code == "item"));
    }

    #[test]
    fn conditional_lowers_both_branches() {
        let source =
            "def view_template\n  if @admin\n    p { \"yes\" }\n  else\n    p { \"no\" }\n  end\nend";
        let children = parse_ok(source);
        let Node::Conditional(c) = &children[0] else {
            panic!("expected conditional");
        };
        assert_eq!(c.condition, "@admin");
        assert_eq!(c.true_branch.len(), 1);
        assert_eq!(c.false_branch.len(), 1);
    }

    #[test]
    fn void_element_call_is_self_closing() {
        let children = parse_ok("def view_template\n  img(src: \"/a.png\")\n  br\nend");
        let Node::Element(img) = &children[0] else {
            panic!("expected element");
        };
        assert!(img.self_closing);
        assert_eq!(img.attributes.get("src"), Some("/a.png"));
        assert!(matches!(&children[1], Node::Element(br) if br.tag_name == "br" && br.self_closing));
    }

    #[test]
    fn render_call_is_skipped_with_warning() {
        let mut warnings = WarningCollector::new();
        let root = parse(
            "def view_template\n  render Footer\n  p { \"kept\" }\nend",
            &mut warnings,
        )
        .expect("parse");
        let Node::Template(t) = root else { unreachable!() };
        assert_eq!(t.children.len(), 1);
        assert!(warnings.all().iter().any(|w| w.message.contains("render")));
    }

    #[test]
    fn lone_string_argument_is_class_shorthand() {
        let children = parse_ok("def view_template\n  h1 \"title\"\nend");
        let Node::Element(h1) = &children[0] else {
            panic!("expected element");
        };
        assert_eq!(h1.attributes.get("class"), Some("title"));
        assert!(h1.children.is_empty());
    }
}
