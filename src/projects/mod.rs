//! Drivers around the conversion core: the command line and batch conversion.

pub mod batch;
pub mod cli;
