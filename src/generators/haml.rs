//! Haml generator. One node per line, nesting expressed with two-space
//! indentation. An element whose only child is a short single-line text
//! renders inline (`%p Hi`).

use crate::diagnostics::WarningCollector;
use crate::errors::ConvertError;
use crate::generators::{escape_quotes, template_children, INDENT};
use crate::ir::{Element, Node};

const INLINE_TEXT_LIMIT: usize = 40;

/// Renders a template tree as Haml source.
pub fn generate(root: &Node, warnings: &mut WarningCollector) -> Result<String, ConvertError> {
    let mut lines = Vec::new();
    for child in template_children(root)? {
        write_node(&mut lines, child, 0, warnings);
    }
    Ok(lines.join("\n"))
}

fn pad(level: usize) -> String {
    INDENT.repeat(level)
}

fn write_all(lines: &mut Vec<String>, nodes: &[Node], level: usize, warnings: &mut WarningCollector) {
    for node in nodes {
        write_node(lines, node, level, warnings);
    }
}

fn write_node(lines: &mut Vec<String>, node: &Node, level: usize, warnings: &mut WarningCollector) {
    match node {
        Node::Template(template) => write_all(lines, &template.children, level, warnings),
        Node::Element(element) => write_element(lines, element, level, warnings),
        Node::Expression(expression) => {
            let marker = if expression.escaped { "=" } else { "==" };
            lines.push(format!("{}{marker} {}", pad(level), expression.code));
        }
        Node::Block(block) => {
            lines.push(format!("{}- {}", pad(level), block.code));
            write_all(lines, &block.children, level + 1, warnings);
        }
        Node::Conditional(conditional) => {
            lines.push(format!("{}- if {}", pad(level), conditional.condition));
            write_all(lines, &conditional.true_branch, level + 1, warnings);
            if !conditional.false_branch.is_empty() {
                lines.push(format!("{}- else", pad(level)));
                write_all(lines, &conditional.false_branch, level + 1, warnings);
            }
        }
        Node::Loop(r#loop) => {
            lines.push(format!(
                "{}- {}.each do |{}|",
                pad(level),
                r#loop.collection,
                r#loop.variable
            ));
            write_all(lines, &r#loop.body, level + 1, warnings);
        }
        Node::StaticContent(content) => {
            for line in content.text.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                lines.push(format!("{}{}", pad(level), escape_text_line(trimmed)));
            }
        }
        Node::Comment(comment) => {
            let marker = if comment.html_visible { "/" } else { "-#" };
            lines.push(format!("{}{marker} {}", pad(level), comment.text));
        }
    }
}

fn write_element(
    lines: &mut Vec<String>,
    element: &Element,
    level: usize,
    warnings: &mut WarningCollector,
) {
    let mut line = format!("{}%{}", pad(level), element.tag_name);
    if !element.attributes.is_empty() {
        let attrs = element
            .attributes
            .iter()
            .map(|(key, value)| format!("{key}: \"{}\"", escape_quotes(value)))
            .collect::<Vec<_>>()
            .join(", ");
        line.push_str(&format!("{{ {attrs} }}"));
    }

    if let Some(text) = inline_text(element) {
        line.push(' ');
        line.push_str(text);
        lines.push(line);
        return;
    }

    lines.push(line);
    write_all(lines, &element.children, level + 1, warnings);
}

/// A single short single-line static child renders on the element's line.
fn inline_text(element: &Element) -> Option<&str> {
    match element.children.as_slice() {
        [Node::StaticContent(content)] => {
            let text = content.text.trim();
            if !text.is_empty() && !text.contains('\n') && text.len() <= INLINE_TEXT_LIMIT {
                Some(text)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Leading markup characters would reparse as Haml syntax, so escape them.
fn escape_text_line(text: &str) -> String {
    match text.chars().next() {
        Some('%' | '-' | '=' | '/' | '~' | '.' | '#') => format!("\\{text}"),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AttrMap, Conditional, Loop};

    fn generate_ok(root: &Node) -> String {
        let mut warnings = WarningCollector::new();
        generate(root, &mut warnings).expect("generate should succeed")
    }

    fn element(tag: &str, attrs: &[(&str, &str)], children: Vec<Node>) -> Node {
        Node::Element(Element {
            tag_name: tag.into(),
            attributes: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            children,
            self_closing: false,
            pos: None,
        })
    }

    #[test]
    fn nested_elements_indent_and_short_text_inlines() {
        let tree = Node::template(vec![element(
            "div",
            &[("class", "test")],
            vec![element("p", &[], vec![Node::text("Hi")])],
        )]);
        assert_eq!(generate_ok(&tree), "%div{ class: \"test\" }\n  %p Hi");
    }

    #[test]
    fn long_text_goes_on_its_own_line() {
        let long = "a".repeat(50);
        let tree = Node::template(vec![element("p", &[], vec![Node::text(long.clone())])]);
        assert_eq!(generate_ok(&tree), format!("%p\n  {long}"));
    }

    #[test]
    fn expressions_comments_and_blocks_use_their_markers() {
        let tree = Node::template(vec![
            Node::expression("@name", true),
            Node::expression("raw_html", false),
            Node::comment("shown", true),
            Node::comment("hidden", false),
            Node::block("helper_call", vec![]),
        ]);
        assert_eq!(
            generate_ok(&tree),
            "= @name\n== raw_html\n/ shown\n-# hidden\n- helper_call"
        );
    }

    #[test]
    fn conditional_and_loop_render_dash_lines() {
        let tree = Node::template(vec![
            Node::Conditional(Conditional {
                condition: "@admin".into(),
                true_branch: vec![Node::text("yes")],
                false_branch: vec![Node::text("no")],
                pos: None,
            }),
            Node::Loop(Loop {
                collection: "@items".into(),
                variable: "item".into(),
                body: vec![Node::expression("item", true)],
                pos: None,
            }),
        ]);
        assert_eq!(
            generate_ok(&tree),
            "- if @admin\n  yes\n- else\n  no\n- @items.each do |item|\n  = item"
        );
    }

    #[test]
    fn whitespace_only_static_is_skipped() {
        let tree = Node::template(vec![Node::text("  \n  "), element("br", &[], vec![])]);
        let output = generate_ok(&tree);
        assert_eq!(output, "%br");
        let mut warnings = WarningCollector::new();
        assert!(generate(&tree, &mut warnings).is_ok());
    }

    #[test]
    fn text_starting_with_markup_is_escaped() {
        let tree = Node::template(vec![Node::text("- not code")]);
        assert_eq!(generate_ok(&tree), "\\- not code");
    }

    #[test]
    fn void_element_renders_bare() {
        let tree = Node::template(vec![Node::Element(Element {
            tag_name: "img".into(),
            attributes: {
                let mut attrs = AttrMap::new();
                attrs.insert("src", "/a.png");
                attrs
            },
            children: vec![],
            self_closing: true,
            pos: None,
        })]);
        assert_eq!(generate_ok(&tree), "%img{ src: \"/a.png\" }");
    }
}
