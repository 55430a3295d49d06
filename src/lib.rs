//! Semantic conversion and operator lowering for translating pre-analysed source
//! documents into target-language source.

pub mod backends;
pub mod conversion_core;
pub mod projects;
pub mod settings;

pub mod compiler_tests {
    pub mod integration_test_runner;
}
