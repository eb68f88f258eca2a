// Structural dumps of a tree, used by tests, the CLI `--ast` flag and the
// code generator's fallback for nodes it cannot emit

use std::convert::Infallible;

use super::{NodeId, Tree};
use crate::visit::{finish, walk, Visitor, Walk};

struct TypeTree {
    lines: Vec<String>,
    depth: usize,
}

impl Visitor for TypeTree {
    type Error = Infallible;

    fn pre(&mut self, tree: &Tree, id: NodeId) -> Result<Walk, Infallible> {
        self.lines
            .push(format!("{}{}", "  ".repeat(self.depth), tree.kind(id)));
        self.depth += 1;
        Ok(Walk::Descend)
    }

    fn post(&mut self, _tree: &Tree, _id: NodeId) -> Result<(), Infallible> {
        self.depth -= 1;
        Ok(())
    }
}

/// One line per node, indented by depth: `["Program", "  ExpressionStatement", ...]`
pub fn type_tree(tree: &Tree, root: NodeId) -> Vec<String> {
    let mut dump = TypeTree {
        lines: Vec::new(),
        depth: 0,
    };
    finish(walk(tree, root, &mut dump));
    dump.lines
}

/// JSON rendering of a single node; children appear as raw handles
pub fn raw(tree: &Tree, id: NodeId) -> String {
    serde_json::to_string(tree.get(id)).unwrap_or_else(|_| tree.kind(id).to_string())
}
