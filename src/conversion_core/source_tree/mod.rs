//! The pre-analysed source document.
//!
//! Documents arrive as JSON: syntax nodes already annotated with the facts a
//! semantic model produced for them. Parsing and binding the source language
//! happen elsewhere.

pub mod source_nodes;
