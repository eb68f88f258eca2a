//! Top-down scopes and closure capture lists.
//!
//! The scope of a node is its parent's scope plus every name the node's
//! [`NeedsMap`](super::NeedsMap) marks as bound; function-like nodes add
//! their parameters first. A closure captures each name it needs that the
//! scope in effect binds, plus the outer-instance alias.

use std::collections::HashMap;
use std::convert::Infallible;

use tracing::{debug, trace};

use super::needs::Needs;
use crate::ast::{variable_key, Node, NodeId, Tree};
use crate::passes::field_ref::OUTER_SELF;
use crate::visit::{finish, walk, Visitor, Walk};

#[derive(Debug, Clone, Default)]
pub struct Captures {
    scopes: HashMap<NodeId, Vec<String>>,
    used: HashMap<NodeId, Vec<String>>,
}

impl Captures {
    pub fn compute(tree: &Tree, root: NodeId, needs: &Needs) -> Captures {
        let mut scopes = ScopeStack {
            needs,
            stack: vec![Vec::new()],
            captures: Captures::default(),
        };
        finish(walk(tree, root, &mut scopes));
        debug!(closures = scopes.captures.used.len(), "captures computed");
        scopes.captures
    }

    /// Names bound in the scope of `id`
    pub fn scope(&self, id: NodeId) -> &[String] {
        self.scopes.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Capture list of a function expression, in first-reference order
    pub fn used(&self, id: NodeId) -> &[String] {
        self.used.get(&id).map(Vec::as_slice).unwrap_or_default()
    }
}

struct ScopeStack<'n> {
    needs: &'n Needs,
    stack: Vec<Vec<String>>,
    captures: Captures,
}

impl ScopeStack<'_> {
    fn push(&mut self, bound: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut scope = self.stack.last().cloned().unwrap_or_default();
        for name in bound {
            if !scope.contains(&name) {
                scope.push(name);
            }
        }
        self.stack.push(scope.clone());
        scope
    }
}

impl Visitor for ScopeStack<'_> {
    type Error = Infallible;

    fn pre(&mut self, tree: &Tree, id: NodeId) -> Result<Walk, Infallible> {
        let node = &tree[id];
        let params: Vec<String> = node
            .params()
            .iter()
            .filter_map(|param| match tree[*param] {
                Node::FormalParameter { id, .. } => tree.name(id),
                _ => None,
            })
            .map(|name| variable_key(name).to_string())
            .collect();
        let table = self.needs;
        let needs = table.get(id);
        let bound = needs
            .into_iter()
            .flatten()
            .filter(|(_, bound)| **bound)
            .map(|(name, _)| name.clone());
        let scope = self.push(params.iter().cloned().chain(bound));

        if let (Node::FunctionExpression { .. }, Some(needs)) = (node, needs) {
            let used: Vec<String> = needs
                .keys()
                .filter(|name| {
                    scope.contains(name) || params.contains(name) || name.as_str() == OUTER_SELF
                })
                .cloned()
                .collect();
            trace!(closure = %id, ?used, "capture list");
            self.captures.used.insert(id, used);
        }
        self.captures.scopes.insert(id, scope);
        Ok(Walk::Default)
    }

    fn post(&mut self, _tree: &Tree, _id: NodeId) -> Result<(), Infallible> {
        self.stack.pop();
        Ok(())
    }
}
