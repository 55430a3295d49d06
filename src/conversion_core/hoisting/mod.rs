//! Statement hoisting.
//!
//! Lowering an expression sometimes needs statements that cannot live inside it:
//! temporaries for by-reference arguments, their write-backs and synthesized local
//! functions. Each statement being lowered opens a scope; whatever was hoisted
//! while lowering it is spliced around it when the scope is closed.

pub mod hoisting_sink;
