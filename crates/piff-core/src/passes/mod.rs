/*!
# Desugaring passes

Rewrites that lower Piff-only syntax into shapes the PHP generator can emit
directly. Each pass is a [`VisitorMut`](crate::visit::VisitorMut) whose state
(frame stacks, current class and method) lives in the pass struct.

Run order matters and is fixed by [`desugar`]:

1. [`compose`]: `a |> f(_)` becomes `f(a)`
2. [`field_ref`]: `@x`, `@@x`, `@`, `@@` become `this`/`that`/`self` accesses
3. [`property_literal`]: `[a: 1]` keys become string literals
4. [`string_concat`]: marks `+` chains that involve strings

[`parent_call`] only annotates calls and runs after capture analysis.
Composition is the only pass that can fail.
*/

pub mod compose;
pub mod field_ref;
pub mod parent_call;
pub mod property_literal;
pub mod string_concat;

#[cfg(test)]
mod passes_tests;

use tracing::debug;

use crate::ast::{NodeId, Tree};

pub use compose::ComposeError;

/// Apply the tree-rewriting passes in order
pub fn desugar(tree: &mut Tree, root: NodeId) -> Result<(), ComposeError> {
    compose::run(tree, root)?;
    field_ref::run(tree, root);
    property_literal::run(tree, root);
    string_concat::run(tree, root);
    debug!(nodes = tree.len(), "desugaring complete");
    Ok(())
}
