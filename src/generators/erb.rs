//! ERB generator. Output is inline: elements render as explicit tag pairs
//! and static text passes through byte for byte, so an ERB-to-ERB conversion
//! of plain markup is a fixpoint.

use crate::diagnostics::WarningCollector;
use crate::errors::ConvertError;
use crate::generators::{escape_attribute, template_children};
use crate::ir::Node;

/// Renders a template tree as ERB source.
pub fn generate(root: &Node, _warnings: &mut WarningCollector) -> Result<String, ConvertError> {
    let mut output = String::new();
    for child in template_children(root)? {
        write_node(&mut output, child);
    }
    Ok(output)
}

fn write_all(output: &mut String, nodes: &[Node]) {
    for node in nodes {
        write_node(output, node);
    }
}

fn write_node(output: &mut String, node: &Node) {
    match node {
        Node::Template(template) => write_all(output, &template.children),
        Node::Element(element) => {
            output.push('<');
            output.push_str(&element.tag_name);
            for (key, value) in element.attributes.iter() {
                output.push(' ');
                output.push_str(key);
                output.push_str("=\"");
                output.push_str(&escape_attribute(value));
                output.push('"');
            }
            if element.self_closing {
                output.push_str(" />");
                return;
            }
            output.push('>');
            write_all(output, &element.children);
            output.push_str("</");
            output.push_str(&element.tag_name);
            output.push('>');
        }
        Node::Expression(expression) => {
            if expression.escaped {
                output.push_str(&format!("<%= {} %>", expression.code));
            } else {
                output.push_str(&format!("<%== {} %>", expression.code));
            }
        }
        Node::Block(block) => {
            output.push_str(&format!("<% {} %>", block.code));
            if !block.children.is_empty() {
                write_all(output, &block.children);
                output.push_str("<% end %>");
            }
        }
        Node::Conditional(conditional) => {
            output.push_str(&format!("<% if {} %>", conditional.condition));
            write_all(output, &conditional.true_branch);
            if !conditional.false_branch.is_empty() {
                output.push_str("<% else %>");
                write_all(output, &conditional.false_branch);
            }
            output.push_str("<% end %>");
        }
        Node::Loop(r#loop) => {
            output.push_str(&format!(
                "<% {}.each do |{}| %>",
                r#loop.collection, r#loop.variable
            ));
            write_all(output, &r#loop.body);
            output.push_str("<% end %>");
        }
        Node::StaticContent(content) => output.push_str(&content.text),
        Node::Comment(comment) => {
            if comment.html_visible {
                output.push_str(&format!("<!-- {} -->", comment.text));
            } else {
                output.push_str(&format!("<%# {} %>", comment.text));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AttrMap, Conditional, Element, Loop};

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
    fn elements_render_as_tag_pairs() {
        let tree = Node::template(vec![element(
            "div",
            &[("class", "card")],
            vec![element("p", &[], vec![Node::text("Hi")])],
        )]);
        assert_eq!(generate_ok(&tree), "<div class=\"card\"><p>Hi</p></div>");
    }

    #[test]
    fn self_closing_renders_with_slash() {
        let tree = Node::template(vec![Node::Element(Element {
            tag_name: "br".into(),
            attributes: AttrMap::new(),
            children: vec![],
            self_closing: true,
            pos: None,
        })]);
        assert_eq!(generate_ok(&tree), "<br />");
    }

    #[test]
    fn expressions_and_comments_pick_their_tags() {
        let tree = Node::template(vec![
            Node::expression("@name", true),
            Node::expression("raw_html", false),
            Node::comment("hidden", false),
            Node::comment("shown", true),
        ]);
        assert_eq!(
            generate_ok(&tree),
            "<%= @name %><%== raw_html %><%# hidden %><!-- shown -->"
        );
    }

    #[test]
    fn conditional_renders_both_branches() {
        let tree = Node::template(vec![Node::Conditional(Conditional {
            condition: "@admin".into(),
            true_branch: vec![Node::text("yes")],
            false_branch: vec![Node::text("no")],
            pos: None,
        })]);
        assert_eq!(
            generate_ok(&tree),
            "<% if @admin %>yes<% else %>no<% end %>"
        );
    }

    #[test]
    fn loop_renders_each_block() {
        let tree = Node::template(vec![Node::Loop(Loop {
            collection: "@items".into(),
            variable: "item".into(),
            body: vec![element("li", &[], vec![Node::expression("item", true)])],
            pos: None,
        })]);
        assert_eq!(
            generate_ok(&tree),
            "<% @items.each do |item| %><li><%= item %></li><% end %>"
        );
    }

    #[test]
    fn block_with_children_closes_its_scope() {
        let tree = Node::template(vec![
            Node::block("content_tag :span", vec![Node::text("x")]),
            Node::block("helper_call", vec![]),
        ]);
        assert_eq!(
            generate_ok(&tree),
            "<% content_tag :span %>x<% end %><% helper_call %>"
        );
    }

    #[test]
    fn attribute_values_are_escaped() {
        let tree = Node::template(vec![element("div", &[("title", "a \"b\" & c")], vec![])]);
        assert_eq!(
            generate_ok(&tree),
            "<div title=\"a &quot;b&quot; &amp; c\"></div>"
        );
    }
}
