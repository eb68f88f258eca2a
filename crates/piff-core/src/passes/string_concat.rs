//! `+` means string concatenation once a string is involved.
//!
//! A `+` is marked when an operand, seen through parentheses, is a string
//! literal, an interpolated string or an already marked `+`. Marking in both
//! hooks lets `1 + "2" + 3` mark the outer node on the way back up.

use tracing::debug;

use crate::ast::{Literal, Node, NodeId, Tree};
use crate::visit::{finish, walk_mut, VisitorMut, Walk};

fn is_string(tree: &Tree, id: NodeId) -> bool {
    matches!(
        tree[tree.unparen(id)],
        Node::Literal {
            value: Literal::String { .. }
        } | Node::StringExpression { .. }
            | Node::BinaryExpression { concat: true, .. }
    )
}

#[derive(Default)]
pub struct StringConcat {
    marked: usize,
}

impl StringConcat {
    fn mark(&mut self, tree: &mut Tree, id: NodeId) {
        let Node::BinaryExpression {
            ref operator,
            left,
            right,
            concat: false,
        } = tree[id]
        else {
            return;
        };
        if operator != "+" || !(is_string(tree, left) || is_string(tree, right)) {
            return;
        }
        if let Node::BinaryExpression { concat, .. } = tree.get_mut(id) {
            *concat = true;
            self.marked += 1;
        }
    }
}

impl VisitorMut for StringConcat {
    type Error = std::convert::Infallible;

    fn pre(&mut self, tree: &mut Tree, id: NodeId) -> Result<Walk, Self::Error> {
        self.mark(tree, id);
        Ok(Walk::Default)
    }

    fn post(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        self.mark(tree, id);
        Ok(())
    }
}

pub fn run(tree: &mut Tree, root: NodeId) {
    let mut pass = StringConcat::default();
    finish(walk_mut(tree, root, &mut pass));
    debug!(marked = pass.marked, "string concatenation pass");
}
