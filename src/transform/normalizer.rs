//! Canonicalizes a parsed tree: adjacent static siblings merge into one node
//! and empty static nodes disappear. Running it twice changes nothing.

use crate::ir::{Node, StaticContent};

/// Rewrites the tree bottom-up into its canonical form.
pub fn normalize(node: Node) -> Node {
    match node {
        Node::Template(mut t) => {
            t.children = normalize_children(t.children);
            Node::Template(t)
        }
        Node::Element(mut e) => {
            e.children = normalize_children(e.children);
            Node::Element(e)
        }
        Node::Block(mut b) => {
            b.children = normalize_children(b.children);
            Node::Block(b)
        }
        Node::Conditional(mut c) => {
            c.true_branch = normalize_children(c.true_branch);
            c.false_branch = normalize_children(c.false_branch);
            Node::Conditional(c)
        }
        Node::Loop(mut l) => {
            l.body = normalize_children(l.body);
            Node::Loop(l)
        }
        leaf @ (Node::Expression(_) | Node::StaticContent(_) | Node::Comment(_)) => leaf,
    }
}

fn normalize_children(children: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        match normalize(child) {
            Node::StaticContent(current) => {
                if current.text.is_empty() {
                    continue;
                }
                if let Some(Node::StaticContent(previous)) = out.last_mut() {
                    previous.text.push_str(&current.text);
                } else {
                    out.push(Node::StaticContent(StaticContent {
                        text: current.text,
                        pos: current.pos,
                    }));
                }
            }
            other => out.push(other),
        }
    }
    out
}
