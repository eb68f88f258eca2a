/*!
# Tree traversal

Generic depth-first walk over a [`Tree`]. A pass is a type implementing
[`Visitor`] (read-only) or [`VisitorMut`] (may rewrite the tree); the walk
itself holds no pass state.

For every node the walk calls `pre`, visits the children unless `pre`
answered [`Walk::Skip`], then calls `post`. Children are listed after `pre`
returns, so a node grafted in `pre` is descended as its new shape. Hooks
dispatch on the node kind with a `match` and fall through to a wildcard arm.
*/


use std::convert::Infallible;

use crate::ast::{NodeId, Tree};

/// Answer of a `pre` hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Walk {
    /// The hook did not say; children are visited
    #[default]
    Default,
    Descend,
    Skip,
}

impl Walk {
    pub fn descends(self) -> bool {
        !matches!(self, Walk::Skip)
    }
}

/// Read-only traversal hooks
pub trait Visitor {
    type Error;

    fn pre(&mut self, _tree: &Tree, _id: NodeId) -> Result<Walk, Self::Error> {
        Ok(Walk::Default)
    }

    fn post(&mut self, _tree: &Tree, _id: NodeId) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Traversal hooks that may mutate or graft nodes
pub trait VisitorMut {
    type Error;

    fn pre(&mut self, _tree: &mut Tree, _id: NodeId) -> Result<Walk, Self::Error> {
        Ok(Walk::Default)
    }

    fn post(&mut self, _tree: &mut Tree, _id: NodeId) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub fn walk<V: Visitor + ?Sized>(tree: &Tree, id: NodeId, visitor: &mut V) -> Result<(), V::Error> {
    if visitor.pre(tree, id)?.descends() {
        for child in tree.children(id) {
            walk(tree, child, visitor)?;
        }
    }
    visitor.post(tree, id)
}

pub fn walk_mut<V: VisitorMut + ?Sized>(
    tree: &mut Tree,
    id: NodeId,
    visitor: &mut V,
) -> Result<(), V::Error> {
    if visitor.pre(tree, id)?.descends() {
        for child in tree.children(id) {
            walk_mut(tree, child, visitor)?;
        }
    }
    visitor.post(tree, id)
}

/// Unwrap the result of a walk whose hooks cannot fail
pub fn finish(result: Result<(), Infallible>) {
    if let Err(never) = result {
        match never {}
    }
}
