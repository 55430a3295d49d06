//! Converts a set of pre-analysed documents in parallel.
//!
//! Documents share nothing mutable, so each one runs on its own rayon task. Failures
//! stay inside the document (or member) they came from.

use crate::backends::target::render_document;
use crate::conversion_core::ConversionCore;
use crate::conversion_core::compiler_errors::{
    CharPosition, CompilerError, CompilerMessages, ErrorType, TextLocation,
};
use crate::conversion_core::source_tree::source_nodes::SourceDocument;
use crate::settings::Config;
use crate::timer_log;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct DocumentInput {
    pub path: PathBuf,
    pub document: SourceDocument,
}

/// A converted document. `messages` may still hold member-level errors.
#[derive(Debug)]
pub struct DocumentOutput {
    pub path: PathBuf,
    pub name: String,
    pub text: String,
    pub imports: Vec<String>,
    pub messages: CompilerMessages,
}

impl DocumentOutput {
    pub fn failed_members(&self) -> usize {
        self.messages.errors.len()
    }
}

pub fn load_document(path: &Path) -> Result<SourceDocument, CompilerError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            return Err(CompilerError::file_error(
                path,
                format!("Could not read document: {error}"),
            ));
        }
    };

    parse_document(&text, path)
}

pub fn parse_document(text: &str, path: &Path) -> Result<SourceDocument, CompilerError> {
    match serde_json::from_str::<SourceDocument>(text) {
        Ok(document) => Ok(document),
        Err(error) => {
            // serde_json counts lines and columns from one
            let position = CharPosition {
                line_number: error.line().saturating_sub(1) as i32,
                char_column: error.column() as i32,
            };

            Err(CompilerError::new(
                format!("Malformed document: {error}"),
                TextLocation::new(path.to_path_buf(), position, position),
                ErrorType::Syntax,
            ))
        }
    }
}

/// Loads every path, keeping load failures as messages of their own.
pub fn load_documents(paths: &[PathBuf]) -> (Vec<DocumentInput>, Vec<CompilerError>) {
    let mut inputs = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();

    for path in paths {
        match load_document(path) {
            Ok(document) => inputs.push(DocumentInput {
                path: path.to_owned(),
                document,
            }),
            Err(error) => errors.push(error),
        }
    }

    (inputs, errors)
}

pub fn convert_documents(
    documents: &[DocumentInput],
    config: &Config,
) -> Vec<Result<DocumentOutput, CompilerMessages>> {
    let time = Instant::now();
    let core = ConversionCore::new(config);
    let output_config = config.output_config();

    let results: Vec<Result<DocumentOutput, CompilerMessages>> = documents
        .par_iter()
        .map(|input| {
            let converted = core.convert_document(&input.document, &input.path)?;

            Ok(DocumentOutput {
                path: input.path.to_owned(),
                name: converted.document.name.to_owned(),
                text: render_document(&converted.document, &output_config),
                imports: converted.document.imports.to_owned(),
                messages: converted.messages,
            })
        })
        .collect();

    timer_log!(time, "Batch converted in: ");
    results
}

pub fn convert_document(input: &DocumentInput, config: &Config) -> Result<DocumentOutput, CompilerMessages> {
    match convert_documents(std::slice::from_ref(input), config).pop() {
        Some(result) => result,
        None => {
            let mut messages = CompilerMessages::new();
            messages.errors.push(CompilerError::compiler_error(
                "Batch conversion returned no result for a single document",
            ));
            Err(messages)
        }
    }
}

#[cfg(test)]
#[path = "tests/batch_tests.rs"]
mod tests;
