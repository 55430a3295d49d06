//! By-reference argument binding.
//!
//! The source language passes any expression to a `ByRef` parameter, copying through
//! a hidden temporary when it is not plain writable storage. The target only accepts
//! storage locations of the exact parameter type, so the temporaries, their write-backs
//! and, when evaluation order demands it, a wrapping local function are made explicit.

pub mod argument_binder;
pub mod binding_plan;
pub mod local_function;

#[cfg(test)]
mod tests;
