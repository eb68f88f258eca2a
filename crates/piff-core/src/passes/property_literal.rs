//! Bare array keys are string keys: `[a: 1]` compiles to `["a" => 1]`.

use tracing::debug;

use crate::ast::{Literal, Node, NodeId, Quote, Tree};
use crate::visit::{finish, walk_mut, VisitorMut, Walk};

#[derive(Default)]
pub struct PropertyLiteral {
    rewritten: usize,
}

impl VisitorMut for PropertyLiteral {
    type Error = std::convert::Infallible;

    fn pre(&mut self, tree: &mut Tree, id: NodeId) -> Result<Walk, Self::Error> {
        let Node::Property { key: Some(key), .. } = tree[id] else {
            return Ok(Walk::Default);
        };
        if let Node::Identifier { name } = &tree[key] {
            let value = Literal::String {
                value: name.clone(),
                quote: Quote::Double,
            };
            tree.replace(key, Node::Literal { value });
            self.rewritten += 1;
        }
        Ok(Walk::Default)
    }
}

pub fn run(tree: &mut Tree, root: NodeId) {
    let mut pass = PropertyLiteral::default();
    finish(walk_mut(tree, root, &mut pass));
    debug!(rewritten = pass.rewritten, "property literal pass");
}
