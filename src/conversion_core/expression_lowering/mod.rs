//! Walks the annotated source tree and builds the target tree.
//!
//! Every node is lowered in two steps: its natural form first (an operator through
//! operator lowering, a call through the by-reference planner) and then the
//! conversion its facts ask for at the node's boundary. Statements open a hoisting
//! scope so temporaries and write-backs land around the statement that needed them.

pub mod lower_expression;
pub mod lower_statement;

#[cfg(test)]
mod tests;
