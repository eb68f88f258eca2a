//! Instance and class sigils.
//!
//! `@` is `this`, `@x` is `this->x`, `@@` is `self` and `@@x` is `self::x`.
//! Inside a closure the instance is reached through `that`; a method that
//! does so gets `that = this` as its first statement.

use tracing::{debug, trace};

use crate::ast::{Access, Node, NodeId, Tree};
use crate::visit::{finish, walk_mut, VisitorMut, Walk};

pub const OUTER_SELF: &str = "that";

#[derive(Default)]
struct Frame {
    closure_depth: usize,
    used_outer_self: bool,
}

/// `current` is the innermost method body, or the top level, which behaves
/// like a method that never gets the alias
#[derive(Default)]
pub struct FieldRef {
    current: Frame,
    enclosing: Vec<Frame>,
    rewritten: usize,
}

impl FieldRef {
    /// Name of the current instance, recording a use of the alias
    fn instance(&mut self) -> &'static str {
        let frame = &mut self.current;
        if frame.closure_depth > 0 {
            frame.used_outer_self = true;
            OUTER_SELF
        } else {
            "this"
        }
    }

    fn rewrite_sigil(&mut self, tree: &mut Tree, id: NodeId, sigil: &str) {
        let span = tree.span(id);
        let node = if sigil == "@@" {
            Node::Variable {
                name: "self".to_string(),
            }
        } else if sigil == "@" {
            Node::Variable {
                name: self.instance().to_string(),
            }
        } else if let Some(field) = sigil.strip_prefix("@@") {
            let object = tree.alloc(
                Node::Identifier {
                    name: "self".to_string(),
                },
                span,
            );
            let property = tree.alloc(
                Node::Identifier {
                    name: field.to_string(),
                },
                span,
            );
            Node::MemberExpression {
                object,
                property: Some(property),
                access: Access::Static,
                arguments: None,
            }
        } else {
            let field = &sigil[1..];
            let object = tree.alloc(
                Node::Variable {
                    name: self.instance().to_string(),
                },
                span,
            );
            let property = tree.alloc(
                Node::Identifier {
                    name: field.to_string(),
                },
                span,
            );
            Node::MemberExpression {
                object,
                property: Some(property),
                access: Access::Property,
                arguments: None,
            }
        };
        trace!(sigil, "rewriting sigil");
        tree.replace(id, node);
        self.rewritten += 1;
    }
}

impl VisitorMut for FieldRef {
    type Error = std::convert::Infallible;

    fn pre(&mut self, tree: &mut Tree, id: NodeId) -> Result<Walk, Self::Error> {
        match &tree[id] {
            Node::MethodDeclaration { .. } => {
                self.enclosing.push(std::mem::take(&mut self.current));
            }
            Node::FunctionExpression { .. } => self.current.closure_depth += 1,
            Node::Variable { name } if name.starts_with('@') => {
                let sigil = name.clone();
                self.rewrite_sigil(tree, id, &sigil);
            }
            _ => {}
        }
        Ok(Walk::Default)
    }

    fn post(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        match tree[id] {
            Node::FunctionExpression { .. } => {
                let frame = &mut self.current;
                frame.closure_depth = frame.closure_depth.saturating_sub(1);
            }
            Node::MethodDeclaration { body, .. } => {
                let outer = self.enclosing.pop().unwrap_or_default();
                let used = std::mem::replace(&mut self.current, outer).used_outer_self;
                if let (true, Some(body)) = (used, body) {
                    inject_alias(tree, body);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Prepend `that = this` to a method body
fn inject_alias(tree: &mut Tree, body: NodeId) {
    let span = tree.span(body);
    let left = tree.alloc(
        Node::Variable {
            name: OUTER_SELF.to_string(),
        },
        span,
    );
    let right = tree.alloc(
        Node::Variable {
            name: "this".to_string(),
        },
        span,
    );
    let assignment = tree.alloc(
        Node::AssignmentExpression {
            operator: "=".to_string(),
            left,
            right,
            is_static: false,
        },
        span,
    );
    let statement = tree.alloc(
        Node::ExpressionStatement {
            expression: assignment,
        },
        span,
    );
    if let Node::BlockStatement { body } = tree.get_mut(body) {
        body.insert(0, statement);
    }
}

pub fn run(tree: &mut Tree, root: NodeId) {
    let mut pass = FieldRef::default();
    finish(walk_mut(tree, root, &mut pass));
    debug!(rewritten = pass.rewritten, "field reference pass");
}
