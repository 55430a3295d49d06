//! Semantic facts about source nodes, and the two type models they are compared in.

pub mod fact_table;
pub mod native_conversions;
pub mod semantic_types;
pub mod symbols;
pub mod type_facts;
pub mod type_identity;

#[cfg(test)]
mod tests;
