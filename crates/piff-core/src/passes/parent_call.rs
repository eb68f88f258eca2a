//! `parent(args)` calls the overridden method: `parent::name(args)`, or
//! `parent::__construct(args)` inside a constructor (a method named like
//! its class). Explicit `parent::m()` is a static access and stays as is.

use tracing::debug;

use crate::ast::{Node, NodeId, Tree};
use crate::visit::{finish, walk_mut, VisitorMut, Walk};

pub const CONSTRUCTOR: &str = "__construct";

#[derive(Default)]
pub struct ParentCall {
    classes: Vec<String>,
    methods: Vec<String>,
    resolved: usize,
}

impl ParentCall {
    fn target(&self) -> Option<String> {
        let method = self.methods.last()?;
        if self.classes.last() == Some(method) {
            Some(CONSTRUCTOR.to_string())
        } else {
            Some(method.clone())
        }
    }
}

impl VisitorMut for ParentCall {
    type Error = std::convert::Infallible;

    fn pre(&mut self, tree: &mut Tree, id: NodeId) -> Result<Walk, Self::Error> {
        match tree[id] {
            Node::ClassDeclaration { id: name, .. } => {
                self.classes
                    .push(tree.name(name).unwrap_or_default().to_string());
            }
            Node::MethodDeclaration { id: name, .. } => {
                self.methods
                    .push(tree.name(name).unwrap_or_default().to_string());
            }
            Node::CallExpression { callee, .. } if tree.name(callee) == Some("parent") => {
                let target = self.target();
                if let Node::CallExpression { parent_method, .. } = tree.get_mut(id) {
                    *parent_method = target;
                    self.resolved += 1;
                }
            }
            _ => {}
        }
        Ok(Walk::Default)
    }

    fn post(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        match tree[id] {
            Node::ClassDeclaration { .. } => {
                self.classes.pop();
            }
            Node::MethodDeclaration { .. } => {
                self.methods.pop();
            }
            _ => {}
        }
        Ok(())
    }
}

pub fn run(tree: &mut Tree, root: NodeId) {
    let mut pass = ParentCall::default();
    finish(walk_mut(tree, root, &mut pass));
    debug!(resolved = pass.resolved, "parent call pass");
}
