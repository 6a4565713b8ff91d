//! Structural validation. Collects every violation before failing so callers
//! see the whole list at once, not just the first problem.

use crate::errors::ConvertError;
use crate::ir::{
    is_void_element, Block, Conditional, Element, Expression, Loop, Node, Template, Visitor,
};

/// Checks structural invariants across the whole tree.
///
/// Returns `Ok(())` for a well-formed tree, otherwise
/// [`ConvertError::Validation`] listing every violation found.
pub fn validate(root: &Node) -> Result<(), ConvertError> {
    let mut validator = Validator {
        violations: Vec::new(),
        at_root: true,
    };
    validator.visit(root);
    if validator.violations.is_empty() {
        Ok(())
    } else {
        Err(ConvertError::Validation {
            violations: validator.violations,
        })
    }
}

struct Validator {
    violations: Vec<String>,
    at_root: bool,
}

impl Visitor for Validator {
    fn visit(&mut self, node: &Node) {
        if self.at_root {
            self.at_root = false;
            if !matches!(node, Node::Template(_)) {
                self.violations
                    .push(format!("root must be a template, found {}", node.kind()));
            }
        } else if matches!(node, Node::Template(_)) {
            self.violations
                .push("template must only appear at the root".to_string());
        }
        match node {
            Node::Template(n) => self.visit_template(n),
            Node::Element(n) => self.visit_element(n),
            Node::Expression(n) => self.visit_expression(n),
            Node::Block(n) => self.visit_block(n),
            Node::Conditional(n) => self.visit_conditional(n),
            Node::Loop(n) => self.visit_loop(n),
            Node::StaticContent(n) => self.visit_static(n),
            Node::Comment(n) => self.visit_comment(n),
        }
    }

    fn visit_template(&mut self, template: &Template) {
        self.visit_all(&template.children);
    }

    fn visit_element(&mut self, element: &Element) {
        if element.tag_name.is_empty() {
            self.violations.push("element must have a tag name".to_string());
        }
        if is_void_element(&element.tag_name) && !element.children.is_empty() {
            self.violations.push(format!(
                "void element <{}> must not have children",
                element.tag_name
            ));
        }
        self.visit_all(&element.children);
    }

    fn visit_expression(&mut self, expression: &Expression) {
        if expression.code.is_empty() {
            self.violations.push("expression must have code".to_string());
        }
    }

    fn visit_block(&mut self, block: &Block) {
        if block.code.is_empty() {
            self.violations.push("block must have code".to_string());
        }
        self.visit_all(&block.children);
    }

    fn visit_conditional(&mut self, conditional: &Conditional) {
        if conditional.condition.is_empty() {
            self.violations
                .push("conditional must have a condition".to_string());
        }
        self.visit_all(&conditional.true_branch);
        self.visit_all(&conditional.false_branch);
    }

    fn visit_loop(&mut self, r#loop: &Loop) {
        if r#loop.collection.is_empty() {
            self.violations.push("loop must have a collection".to_string());
        }
        if r#loop.variable.is_empty() {
            self.violations.push("loop must have a variable".to_string());
        }
        self.visit_all(&r#loop.body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::AttrMap;

    #[test]
    fn well_formed_tree_passes() {
        let tree = Node::template(vec![
            Node::Element(Element {
                tag_name: "div".into(),
                attributes: AttrMap::new(),
                children: vec![Node::expression("@x", true)],
                self_closing: false,
                pos: None,
            }),
            Node::text("ok"),
        ]);
        assert!(validate(&tree).is_ok());
    }

    #[test]
    fn every_violation_is_reported() {
        let tree = Node::template(vec![
            Node::Element(Element {
                tag_name: String::new(),
                attributes: AttrMap::new(),
                children: vec![],
                self_closing: false,
                pos: None,
            }),
            Node::expression("", true),
            Node::Loop(Loop {
                collection: String::new(),
                variable: String::new(),
                body: vec![],
                pos: None,
            }),
        ]);
        let Err(ConvertError::Validation { violations }) = validate(&tree) else {
            panic!("expected validation failure");
        };
        assert_eq!(violations.len(), 4);
    }

    #[test]
    fn non_template_root_is_a_violation() {
        let Err(ConvertError::Validation { violations }) = validate(&Node::text("x")) else {
            panic!("expected validation failure");
        };
        assert!(violations[0].contains("root"));
    }

    #[test]
    fn void_element_with_children_is_a_violation() {
        let tree = Node::template(vec![Node::Element(Element {
            tag_name: "br".into(),
            attributes: AttrMap::new(),
            children: vec![Node::text("x")],
            self_closing: true,
            pos: None,
        })]);
        assert!(validate(&tree).is_err());
    }
}
