/*!
# Closure capture analysis

PHP closures only see the variables listed in their `use (...)` clause. Two
passes decide that list:

- [`Needs`] runs bottom-up and records, for every node, the variables it
  references and whether the node itself binds them.
- [`Captures`] runs top-down with a scope stack and, for every closure,
  keeps the needed names that an enclosing scope binds.

`Captures::compute` takes the `Needs` table by reference, so the capture
pass cannot run before the needs pass.
*/

pub mod needs;
pub mod scope;

#[cfg(test)]
mod analysis_tests;

pub use needs::{Needs, NeedsMap};
pub use scope::Captures;
