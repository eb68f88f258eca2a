//! Function composition: `a |> f(_) |> g(_)` becomes `g(f(a))`.
//!
//! Every pipe opens a frame on the way down. The `_` placeholders found in
//! its right-hand side are grafted with the left operand, and on the way up
//! the pipe node itself is grafted with the right-hand side. A placeholder
//! inside a pipe's own left operand belongs to an enclosing pipe.

use thiserror::Error;
use tracing::debug;

use crate::ast::{Access, Node, NodeId, NodeKind, Span, Tree};
use crate::visit::{walk_mut, VisitorMut, Walk};

pub const PLACEHOLDER: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error(
        "composition into {target} has no `_` placeholder at line {}, column {}",
        .span.line,
        .span.column
    )]
    MissingPlaceholder { target: NodeKind, span: Span },
    #[error(
        "composition into {target} uses `_` {uses} times at line {}, column {}",
        .span.line,
        .span.column
    )]
    RepeatedPlaceholder {
        target: NodeKind,
        uses: usize,
        span: Span,
    },
}

impl ComposeError {
    /// Location of the offending pipe
    pub fn span(&self) -> Span {
        match self {
            ComposeError::MissingPlaceholder { span, .. }
            | ComposeError::RepeatedPlaceholder { span, .. } => *span,
        }
    }
}

struct Frame {
    object: NodeId,
    property: NodeId,
    active: bool,
    uses: usize,
}

#[derive(Default)]
pub struct Compose {
    frames: Vec<Frame>,
    rewritten: usize,
}

impl VisitorMut for Compose {
    type Error = ComposeError;

    fn pre(&mut self, tree: &mut Tree, id: NodeId) -> Result<Walk, ComposeError> {
        if let Some(frame) = self.frames.last_mut() {
            if frame.property == id {
                frame.active = true;
            }
        }
        if let Node::MemberExpression {
            object,
            property: Some(property),
            access: Access::Pipe,
            ..
        } = tree[id]
        {
            self.frames.push(Frame {
                object,
                property,
                active: false,
                uses: 0,
            });
        }
        Ok(Walk::Default)
    }

    fn post(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), ComposeError> {
        if tree.name(id) == Some(PLACEHOLDER) && tree.kind(id) == NodeKind::Variable {
            if let Some(frame) = self.frames.iter_mut().rev().find(|f| f.active) {
                frame.uses += 1;
                tree.graft(id, frame.object);
            }
            return Ok(());
        }
        if !matches!(
            tree[id],
            Node::MemberExpression {
                access: Access::Pipe,
                ..
            }
        ) {
            return Ok(());
        }
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        let target = tree.kind(frame.property);
        let span = tree.span(id);
        match frame.uses {
            0 => Err(ComposeError::MissingPlaceholder { target, span }),
            1 => {
                tree.graft(id, frame.property);
                self.rewritten += 1;
                Ok(())
            }
            uses => Err(ComposeError::RepeatedPlaceholder { target, uses, span }),
        }
    }
}

pub fn run(tree: &mut Tree, root: NodeId) -> Result<(), ComposeError> {
    let mut pass = Compose::default();
    walk_mut(tree, root, &mut pass)?;
    debug!(rewritten = pass.rewritten, "compose pass");
    Ok(())
}
