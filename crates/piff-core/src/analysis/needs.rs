//! Bottom-up variable requirements.
//!
//! A [`NeedsMap`] maps a variable name (without `$`) to whether the node
//! binds it. Children are merged with a logical or, so a name bound anywhere
//! below counts as bound. Function-like nodes hide what they bind and
//! expose only what they still need from outside.

use std::collections::HashMap;
use std::convert::Infallible;

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{variable_key, Access, Node, NodeId, Tree};
use crate::visit::{finish, walk, Visitor};

/// Variable name to "bound here" flag, in first-reference order
pub type NeedsMap = IndexMap<String, bool>;

fn merge(src: &NeedsMap, dst: &mut NeedsMap) {
    for (name, bound) in src {
        *dst.entry(name.clone()).or_insert(false) |= *bound;
    }
}

fn satisfy(name: &str, dst: &mut NeedsMap) {
    dst.insert(variable_key(name).to_string(), true);
}

#[derive(Debug, Clone, Default)]
pub struct Needs {
    maps: HashMap<NodeId, NeedsMap>,
}

impl Needs {
    pub fn compute(tree: &Tree, root: NodeId) -> Needs {
        let mut needs = Needs::default();
        finish(walk(tree, root, &mut needs));
        debug!(nodes = needs.maps.len(), "needs computed");
        needs
    }

    pub fn get(&self, id: NodeId) -> Option<&NeedsMap> {
        self.maps.get(&id)
    }

    fn merge_child(&self, child: NodeId, dst: &mut NeedsMap) {
        if let Some(src) = self.maps.get(&child) {
            merge(src, dst);
        }
    }

    /// Bind the variable an assignment writes to. Only the root of a member
    /// chain is bound; indexes and properties are plain reads.
    fn satisfy_target(&self, tree: &Tree, target: NodeId, dst: &mut NeedsMap) {
        let target = tree.unparen(target);
        match &tree[target] {
            Node::Variable { name } => satisfy(name, dst),
            Node::MemberExpression {
                object,
                property,
                arguments,
                ..
            } => {
                self.satisfy_target(tree, *object, dst);
                if let Some(property) = property {
                    self.merge_child(*property, dst);
                }
                for arg in arguments.iter().flatten() {
                    self.merge_child(*arg, dst);
                }
            }
            Node::ObjectExpression { properties } => {
                for property in properties {
                    if let Node::Property { key, value } = tree[*property] {
                        if let Some(key) = key {
                            self.merge_child(key, dst);
                        }
                        self.satisfy_target(tree, value, dst);
                    }
                }
            }
            _ => self.merge_child(target, dst),
        }
    }

    fn function_like(&self, tree: &Tree, params: &[NodeId], body: &[NodeId]) -> NeedsMap {
        let mut inner = NeedsMap::new();
        for param in params {
            if let Node::FormalParameter { id, .. } = tree[*param] {
                if let Some(name) = tree.name(id) {
                    satisfy(name, &mut inner);
                }
            }
        }
        for param in params {
            if let Node::FormalParameter {
                default: Some(default),
                ..
            } = tree[*param]
            {
                self.merge_child(default, &mut inner);
            }
        }
        for part in body {
            self.merge_child(*part, &mut inner);
        }
        inner.into_iter().filter(|(_, bound)| !bound).collect()
    }

    fn node_needs(&self, tree: &Tree, id: NodeId) -> NeedsMap {
        let mut map = NeedsMap::new();
        match &tree[id] {
            Node::Variable { name } => {
                map.insert(variable_key(name).to_string(), false);
            }
            Node::Identifier { .. } => {}
            Node::AssignmentExpression { left, right, .. } => {
                self.satisfy_target(tree, *left, &mut map);
                self.merge_child(*right, &mut map);
            }
            Node::FunctionDeclaration { params, body, .. }
            | Node::FunctionExpression { params, body } => {
                map = self.function_like(tree, params, &[*body]);
            }
            Node::MethodDeclaration { params, body, .. } => {
                let body: Vec<_> = body.iter().copied().collect();
                map = self.function_like(tree, params, &body);
            }
            Node::ForEachStatement {
                collection,
                key,
                value,
                body,
            } => {
                for binding in key.iter().chain([value]) {
                    if let Some(name) = tree.name(*binding) {
                        satisfy(name, &mut map);
                    }
                }
                self.merge_child(*collection, &mut map);
                self.merge_child(*body, &mut map);
            }
            Node::CatchClause { param, body, .. } => {
                if let Some(name) = tree.name(*param) {
                    satisfy(name, &mut map);
                }
                self.merge_child(*body, &mut map);
            }
            Node::MemberExpression {
                object,
                property,
                access,
                arguments,
            } => {
                self.merge_child(*object, &mut map);
                if let Some(property) = property {
                    self.merge_child(*property, &mut map);
                    // `a.$b` takes the property name from the variable `$b`
                    let dynamic = tree.name(*property).filter(|name| name.starts_with('$'));
                    if let (Access::Property, Some(name)) = (access, dynamic) {
                        map.entry(variable_key(name).to_string()).or_insert(false);
                    }
                }
                for arg in arguments.iter().flatten() {
                    self.merge_child(*arg, &mut map);
                }
            }
            Node::ClassDeclaration { .. } | Node::InterfaceDeclaration { .. } => {}
            Node::PropertyDeclaration { id: name, .. } => {
                if let Some(name) = tree.name(*name) {
                    satisfy(name, &mut map);
                }
            }
            node => {
                for child in node.children() {
                    self.merge_child(child, &mut map);
                }
            }
        }
        map
    }
}

impl Visitor for Needs {
    type Error = Infallible;

    fn post(&mut self, tree: &Tree, id: NodeId) -> Result<(), Infallible> {
        let map = self.node_needs(tree, id);
        self.maps.insert(id, map);
        Ok(())
    }
}
