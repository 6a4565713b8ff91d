//! Phlex generator. Emits a complete component class: a `view_template`
//! method holding the markup, plus a keyword-splat `initialize` when the
//! tree references instance variables.

use crate::diagnostics::WarningCollector;
use crate::errors::ConvertError;
use crate::generators::{escape_quotes, template_children, INDENT};
use crate::ir::{Conditional, Element, Expression, Loop, Node, Visitor};

/// Renders a template tree as a Phlex component.
pub fn generate(root: &Node, warnings: &mut WarningCollector) -> Result<String, ConvertError> {
    let children = template_children(root)?;

    let mut output = String::new();
    output.push_str("# frozen_string_literal: true\n\n");
    output.push_str("class ViewComponent < Phlex::HTML\n");
    if references_ivars(children) {
        warnings.info(
            "instance variables detected, synthesized an initialize(**attributes) constructor",
        );
        output.push_str("  def initialize(**attributes)\n");
        output.push_str("    @attributes = attributes\n");
        output.push_str("  end\n\n");
    }
    output.push_str("  def view_template\n");
    for child in children {
        write_node(&mut output, child, 2, warnings);
    }
    output.push_str("  end\nend\n");
    Ok(output)
}

fn pad(level: usize) -> String {
    INDENT.repeat(level)
}

fn write_all(output: &mut String, nodes: &[Node], level: usize, warnings: &mut WarningCollector) {
    for node in nodes {
        write_node(output, node, level, warnings);
    }
}

fn write_node(output: &mut String, node: &Node, level: usize, warnings: &mut WarningCollector) {
    match node {
        Node::Template(template) => write_all(output, &template.children, level, warnings),
        Node::Element(element) => write_element(output, element, level, warnings),
        Node::Expression(expression) => {
            let call = if expression.escaped { "plain" } else { "raw" };
            output.push_str(&format!("{}{call} {}\n", pad(level), expression.code));
        }
        Node::Block(block) => {
            if block.children.is_empty() {
                output.push_str(&format!("{}{}\n", pad(level), block.code));
            } else {
                output.push_str(&format!("{}{} do\n", pad(level), block.code));
                write_all(output, &block.children, level + 1, warnings);
                output.push_str(&format!("{}end\n", pad(level)));
            }
        }
        Node::Conditional(conditional) => {
            output.push_str(&format!("{}if {}\n", pad(level), conditional.condition));
            write_all(output, &conditional.true_branch, level + 1, warnings);
            if !conditional.false_branch.is_empty() {
                output.push_str(&format!("{}else\n", pad(level)));
                write_all(output, &conditional.false_branch, level + 1, warnings);
            }
            output.push_str(&format!("{}end\n", pad(level)));
        }
        Node::Loop(r#loop) => {
            output.push_str(&format!(
                "{}{}.each do |{}|\n",
                pad(level),
                r#loop.collection,
                r#loop.variable
            ));
            write_all(output, &r#loop.body, level + 1, warnings);
            output.push_str(&format!("{}end\n", pad(level)));
        }
        Node::StaticContent(content) => {
            let text = content.text.trim();
            if !text.is_empty() {
                output.push_str(&format!("{}plain \"{}\"\n", pad(level), escape_quotes(text)));
            }
        }
        Node::Comment(comment) => {
            if comment.html_visible {
                output.push_str(&format!(
                    "{}comment {{ \"{}\" }}\n",
                    pad(level),
                    escape_quotes(&comment.text)
                ));
            } else {
                output.push_str(&format!("{}# {}\n", pad(level), comment.text));
            }
        }
    }
}

fn write_element(
    output: &mut String,
    element: &Element,
    level: usize,
    warnings: &mut WarningCollector,
) {
    let mut line = format!("{}{}", pad(level), element.tag_name);
    if !element.attributes.is_empty() {
        let attrs = element
            .attributes
            .iter()
            .map(|(key, value)| format!("{key}: \"{}\"", escape_quotes(value)))
            .collect::<Vec<_>>()
            .join(", ");
        line.push_str(&format!("({attrs})"));
    }

    if element.self_closing || element.children.is_empty() {
        output.push_str(&line);
        output.push('\n');
        return;
    }

    output.push_str(&line);
    output.push_str(" do\n");
    write_all(output, &element.children, level + 1, warnings);
    output.push_str(&format!("{}end\n", pad(level)));
}

// ============================================================================
// INSTANCE-VARIABLE SCAN
// ============================================================================

struct IvarScan {
    found: bool,
}

impl Visitor for IvarScan {
    fn visit_expression(&mut self, expression: &Expression) {
        self.found |= expression.code.contains('@');
    }

    fn visit_conditional(&mut self, conditional: &Conditional) {
        self.found |= conditional.condition.contains('@');
        self.visit_all(&conditional.true_branch);
        self.visit_all(&conditional.false_branch);
    }

    fn visit_loop(&mut self, r#loop: &Loop) {
        self.found |= r#loop.collection.contains('@');
        self.visit_all(&r#loop.body);
    }
}

/// True when any expression, condition or loop receiver mentions an `@ivar`,
/// meaning the component needs state passed into its constructor.
fn references_ivars(children: &[Node]) -> bool {
    let mut scan = IvarScan { found: false };
    scan.visit_all(children);
    scan.found
}
