//! Structure-preserving optimization pass. Today it only walks the tree;
//! the hook exists so future rewrites slot into the pipeline without
//! touching the converter.

use crate::ir::{Node, Visitor};

struct Walk;

impl Visitor for Walk {}

/// Optimizes a normalized tree. Currently the identity transform.
pub fn optimize(node: Node) -> Node {
    Walk.visit(&node);
    node
}
