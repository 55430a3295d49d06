//! Semantic conversion and operator lowering.
//!
//! A document arrives with every node already annotated by the source language's
//! semantic model. The core decides, node by node, whether the target language's own
//! rules already produce the same value or whether an explicit cast, a runtime helper
//! call or a rewritten operator is needed, and builds the target tree accordingly.

pub mod compiler_messages {
    pub mod compiler_dev_logging;
    pub mod compiler_errors;
    pub mod compiler_warnings;
    pub mod display_messages;
}

pub use compiler_messages::{compiler_errors, compiler_warnings, display_messages};

pub mod conversions;
pub mod expression_lowering;
pub mod hoisting;
pub mod operators;
pub mod ref_arguments;
pub mod source_tree;
pub mod type_facts;

use crate::backends::target::{TargetDocument, TargetMember};
use crate::backends::target::target_statement::TargetStatement;
use crate::conversion_core::compiler_errors::{CompilerError, CompilerMessages, ErrorMetaDataKey};
use crate::conversion_core::compiler_warnings::{CompilerWarning, WarningKind};
use crate::conversion_core::conversions::ConversionPipeline;
use crate::conversion_core::conversions::runtime_helpers::RuntimeHelpers;
use crate::conversion_core::expression_lowering::lower_expression::ExpressionLowerer;
use crate::conversion_core::expression_lowering::lower_statement::{
    StatementLowerer, reserve_document_identifiers,
};
use crate::conversion_core::hoisting::hoisting_sink::HoistingSink;
use crate::conversion_core::operators::operator_case::LoweringContext;
use crate::conversion_core::source_tree::source_nodes::{SourceDocument, SourceStatement};
use crate::conversion_core::type_facts::fact_table::FactTable;
use crate::conversion_core::type_facts::type_identity::TypeIdentityTable;
use crate::settings::{CompareMethod, Config};
use crate::{conversion_log, timer_log};
use std::path::Path;
use std::time::Instant;

/// The converted document along with everything reported while converting it.
/// Member-level errors leave an error marker in the document and an entry here.
#[derive(Debug)]
pub struct ConvertedDocument {
    pub document: TargetDocument,
    pub messages: CompilerMessages,
}

pub struct ConversionCore<'a> {
    config: &'a Config,
    helpers: RuntimeHelpers,
}

impl<'a> ConversionCore<'a> {
    pub fn new(config: &'a Config) -> Self {
        ConversionCore {
            config,
            helpers: RuntimeHelpers::new(&config.runtime),
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// Converts one document. Only internal invariant violations fail the whole document;
    /// any other error is isolated to the member it came from.
    pub fn convert_document(
        &self,
        source: &SourceDocument,
        path: &Path,
    ) -> Result<ConvertedDocument, CompilerMessages> {
        let time = Instant::now();
        let mut messages = CompilerMessages::new();

        let facts = FactTable::from_document(source);
        let mut identities = TypeIdentityTable::with_builtins();
        facts.register_types(&mut identities);
        messages.warnings.extend(unmapped_types(source, &identities));

        let pipeline = ConversionPipeline::new(&identities, &self.helpers);

        let compare_method = match source.compare_text {
            Some(true) => CompareMethod::Text,
            Some(false) => CompareMethod::Binary,
            None => self.config.comparison.mode,
        };

        let mut sink = HoistingSink::new();
        reserve_document_identifiers(source, &mut sink);

        let mut expressions = ExpressionLowerer::new(&facts, &pipeline, LoweringContext::default());
        let mut members = Vec::with_capacity(source.members.len());

        for member in &source.members {
            expressions.set_context(LoweringContext {
                compare_method,
                in_expression_tree: member.in_expression_tree,
            });

            let imports = sink.imports_checkpoint();
            let lowered = StatementLowerer::new(&mut expressions).lower_member(member, &mut sink);
            messages.warnings.extend(expressions.take_warnings());

            let statements = match lowered {
                Ok(statements) => statements,
                Err(error) => {
                    let mut error = locate(error, path);
                    error.new_metadata_entry(ErrorMetaDataKey::MemberName, member.name.as_str());

                    if error.aborts_document() {
                        messages.errors.push(error);
                        return Err(messages);
                    }

                    conversion_log!(format!("[Lowering] member '{}' failed: {}", member.name, error.msg));
                    sink.restore_imports(imports);
                    let marker = TargetStatement::ErrorMarker {
                        member: member.name.to_owned(),
                        message: error.msg.to_owned(),
                    };
                    messages.errors.push(error);
                    vec![marker]
                }
            };

            members.push(TargetMember {
                name: member.name.to_owned(),
                location: member.location.to_owned(),
                statements,
            });
        }

        timer_log!(time, "Document converted in: ");

        Ok(ConvertedDocument {
            document: TargetDocument {
                name: source.name.to_owned(),
                imports: sink.into_required_imports(),
                members,
            },
            messages,
        })
    }
}

// Errors raised deep in lowering only know the node they came from
fn locate(error: CompilerError, path: &Path) -> CompilerError {
    match error.location.scope.as_os_str().is_empty() {
        true => error.with_file_path(path.to_owned()),
        false => error,
    }
}

// Declared local types the target type model has no counterpart for
fn unmapped_types(source: &SourceDocument, identities: &TypeIdentityTable) -> Vec<CompilerWarning> {
    let mut warnings = Vec::new();

    for member in &source.members {
        for statement in &member.statements {
            if let SourceStatement::Local { ty, .. } = statement {
                if identities.resolve(ty).is_none() {
                    warnings.push(CompilerWarning::new(
                        ty.to_string(),
                        member.location.to_owned(),
                        WarningKind::UnmappedType,
                    ));
                }
            }
        }
    }

    warnings
}
