use crate::conversion_core::compiler_messages::compiler_warnings::CompilerWarning;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// The final set of errors and warnings emitted while converting a document
#[derive(Debug, Default)]
pub struct CompilerMessages {
    pub errors: Vec<CompilerError>,
    pub warnings: Vec<CompilerWarning>,
}

impl CompilerMessages {
    pub fn new() -> Self {
        CompilerMessages {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharPosition {
    pub line_number: i32,
    pub char_column: i32,
}

/// Where a source node lives. Documents are pre-analysed, so the scope is just the
/// document path (or its name when it was never on disk).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextLocation {
    #[serde(default)]
    pub scope: PathBuf,
    #[serde(default)]
    pub start_pos: CharPosition,
    #[serde(default)]
    pub end_pos: CharPosition,
}

impl TextLocation {
    pub fn new(scope: PathBuf, start: CharPosition, end: CharPosition) -> Self {
        Self {
            scope,
            start_pos: start,
            end_pos: end,
        }
    }

    pub fn new_just_line(line: i32) -> Self {
        Self {
            scope: PathBuf::new(),
            start_pos: CharPosition {
                line_number: line,
                char_column: 0,
            },
            end_pos: CharPosition {
                line_number: line,
                char_column: 120, // Arbitrary number
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize)]
pub enum ErrorMetaDataKey {
    CompilationStage,

    // Optional suggestions
    PrimarySuggestion,     // One-line fix or top-level idea
    AlternativeSuggestion, // Secondary alternative

    // Data type information
    ExpectedType,
    FoundType,
    OperatorKind,
    ConversionKind,
    MemberName,
}

#[derive(Debug, Clone)]
pub struct CompilerError {
    pub msg: String,

    // The scope is the document path; the member is attached separately once the
    // batch driver knows which member the error came from.
    pub location: TextLocation,
    pub error_type: ErrorType,

    // Structured detail for the JSON diagnostics output
    pub metadata: HashMap<ErrorMetaDataKey, String>,
}

impl CompilerError {
    pub fn new(msg: impl Into<String>, location: TextLocation, error_type: ErrorType) -> Self {
        CompilerError {
            msg: msg.into(),
            location,
            error_type,
            metadata: HashMap::new(),
        }
    }

    pub fn with_file_path(mut self, file_path: PathBuf) -> Self {
        self.location.scope = file_path;
        self
    }

    pub fn with_error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = error_type;
        self
    }

    pub fn new_metadata_entry(&mut self, key: ErrorMetaDataKey, value: impl Into<String>) {
        self.metadata.insert(key, value.into());
    }

    /// An operator/operand combination that has no faithful lowering
    pub fn unsupported_operator(msg: impl Into<String>, location: TextLocation) -> Self {
        CompilerError::new(msg, location, ErrorType::UnsupportedOperator)
    }

    /// A conversion that cannot be expressed in the target language
    pub fn unsupported_conversion(msg: impl Into<String>, location: TextLocation) -> Self {
        CompilerError::new(msg, location, ErrorType::UnsupportedConversion)
    }

    /// Missing or contradictory semantic facts for a node
    pub fn new_fact_error(msg: impl Into<String>, location: TextLocation) -> Self {
        CompilerError::new(msg, location, ErrorType::Facts)
    }

    /// Create a compiler error (internal bug, not user's fault)
    pub fn compiler_error(msg: impl Into<String>) -> Self {
        CompilerError::new(msg, TextLocation::default(), ErrorType::Compiler)
    }

    /// Create a file system error
    pub fn file_error(path: &std::path::Path, msg: impl Into<String>) -> Self {
        CompilerError::new(
            msg,
            TextLocation::new(
                path.to_path_buf(),
                CharPosition::default(),
                CharPosition::default(),
            ),
            ErrorType::File,
        )
    }

    /// Internal invariant violations abort the current document instead of just one member
    pub fn aborts_document(&self) -> bool {
        matches!(self.error_type, ErrorType::Compiler)
    }
}

// Adds more information to the CompilerError
// So it knows what stage failed and how the batch driver should isolate it
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum ErrorType {
    Syntax,
    Facts,
    UnsupportedOperator,
    UnsupportedConversion,
    File,
    Config,
    Compiler,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::Compiler => "Compiler Bug",
        ErrorType::Syntax => "Malformed Document",
        ErrorType::Facts => "Semantic Facts Error",
        ErrorType::UnsupportedOperator => "Unsupported Operator",
        ErrorType::UnsupportedConversion => "Unsupported Conversion",
        ErrorType::File => "File Error",
        ErrorType::Config => "Malformed Config",
    }
}

/// Returns a new CompilerError for operator lowerings that have no faithful translation.
///
/// Usage:
/// `return_unsupported_operator_error!("message", location, {
///     OperatorKind => "Is",
///     FoundType => "Int32",
/// })`;
#[macro_export]
macro_rules! return_unsupported_operator_error {
    ($msg:expr, $location:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::conversion_core::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::conversion_core::compiler_errors::ErrorType::UnsupportedOperator,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $(
                    map.insert(
                        $crate::conversion_core::compiler_errors::ErrorMetaDataKey::$key,
                        String::from($value),
                    );
                )*
                map
            },
        })
    };
    ($msg:expr, $location:expr) => {
        return Err($crate::conversion_core::compiler_errors::CompilerError::unsupported_operator(
            $msg, $location,
        ))
    };
}

/// Returns a new CompilerError for missing or contradictory semantic facts.
///
/// Usage: `return_fact_error!("message", location, { ExpectedType => "Int32" })`;
#[macro_export]
macro_rules! return_fact_error {
    ($msg:expr, $location:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::conversion_core::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::conversion_core::compiler_errors::ErrorType::Facts,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $(
                    map.insert(
                        $crate::conversion_core::compiler_errors::ErrorMetaDataKey::$key,
                        String::from($value),
                    );
                )*
                map
            },
        })
    };
    ($msg:expr, $location:expr) => {
        return Err($crate::conversion_core::compiler_errors::CompilerError::new_fact_error(
            $msg, $location,
        ))
    };
}

/// Returns a new CompilerError for internal invariant violations.
/// These abort the current document, never the whole batch.
///
/// Usage: `return_compiler_error!("message {}", arg)`;
#[macro_export]
macro_rules! return_compiler_error {
    ($($msg:tt)+) => {
        return Err($crate::conversion_core::compiler_errors::CompilerError::compiler_error(
            format!($($msg)+),
        ))
    };
}

/// Returns a new CompilerError for a malformed config file.
#[macro_export]
macro_rules! return_config_error {
    ($msg:expr, $path:expr) => {
        return Err($crate::conversion_core::compiler_errors::CompilerError::file_error(
            $path, $msg,
        )
        .with_error_type($crate::conversion_core::compiler_errors::ErrorType::Config))
    };
}
