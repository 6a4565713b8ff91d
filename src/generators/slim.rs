//! Slim generator. Tags render without a sigil, text lines behind `|`, and
//! the comment markers mirror the parser: `/!` stays in rendered HTML, `/`
//! does not.

use crate::diagnostics::WarningCollector;
use crate::errors::ConvertError;
use crate::generators::{escape_attribute, template_children, INDENT};
use crate::ir::{Element, Node};

/// Renders a template tree as Slim source.
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
                lines.push(format!("{}| {trimmed}", pad(level)));
            }
        }
        Node::Comment(comment) => {
            let marker = if comment.html_visible { "/!" } else { "/" };
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
    let mut line = format!("{}{}", pad(level), element.tag_name);
    for (key, value) in element.attributes.iter() {
        line.push_str(&format!(" {key}=\"{}\"", escape_attribute(value)));
    }
    lines.push(line);
    if !element.self_closing {
        write_all(lines, &element.children, level + 1, warnings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Conditional, Loop};

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
    fn elements_nest_with_pipe_text() {
        let tree = Node::template(vec![element(
            "div",
            &[("class", "card")],
            vec![element("p", &[], vec![Node::text("Hello")])],
        )]);
        assert_eq!(generate_ok(&tree), "div class=\"card\"\n  p\n    | Hello");
    }

    #[test]
    fn comment_markers_distinguish_visibility() {
        let tree = Node::template(vec![
            Node::comment("shown", true),
            Node::comment("hidden", false),
        ]);
        assert_eq!(generate_ok(&tree), "/! shown\n/ hidden");
    }

    #[test]
    fn conditional_and_loop_render_dash_lines() {
        let tree = Node::template(vec![
            Node::Conditional(Conditional {
                condition: "@admin".into(),
                true_branch: vec![Node::expression("@name", true)],
                false_branch: vec![],
                pos: None,
            }),
            Node::Loop(Loop {
                collection: "@items".into(),
                variable: "item".into(),
                body: vec![Node::expression("item", false)],
                pos: None,
            }),
        ]);
        assert_eq!(
            generate_ok(&tree),
            "- if @admin\n  = @name\n- @items.each do |item|\n  == item"
        );
    }

    #[test]
    fn attribute_values_are_escaped() {
        let tree = Node::template(vec![element("div", &[("title", "\"x\"")], vec![])]);
        assert_eq!(generate_ok(&tree), "div title=\"&quot;x&quot;\"");
    }
}
