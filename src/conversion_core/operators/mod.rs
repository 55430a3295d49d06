//! Operator lowering.
//!
//! Late-bound operands, option-controlled string comparison, `Like`, exponentiation and
//! the null/reference operators have no direct target counterpart and are substituted
//! with runtime helper calls, null checks or converted operands.

pub mod operator_case;
pub mod operator_lowering;

#[cfg(test)]
mod tests;
