use crate::conversion_core::compiler_errors::{
    CompilerError, CompilerMessages, ErrorMetaDataKey, ErrorType, error_type_to_str,
};
use crate::conversion_core::compiler_warnings::{CompilerWarning, print_formatted_warning};
use saying::say;
use serde_json::{Map, Value, json};
use std::env;
use std::path::{Path, PathBuf};

fn normalize_display_path(path: &Path) -> PathBuf {
    let path_string = path.to_string_lossy();
    if let Some(stripped) = path_string.strip_prefix(r"\\?\") {
        return PathBuf::from(stripped);
    }

    path.to_path_buf()
}

fn relative_display_path(scope: &Path) -> String {
    let normalized_scope = normalize_display_path(scope);

    match env::current_dir() {
        Ok(dir) => {
            let normalized_dir = normalize_display_path(&dir);
            normalized_scope
                .strip_prefix(&normalized_dir)
                .unwrap_or(&normalized_scope)
                .to_string_lossy()
                .to_string()
        }
        Err(_) => normalized_scope.to_string_lossy().to_string(),
    }
}

pub fn print_compiler_messages(messages: CompilerMessages) {
    for err in messages.errors {
        print_formatted_error(err);
    }

    for warning in messages.warnings {
        print_formatted_warning(warning);
    }
}

pub fn print_formatted_error(e: CompilerError) {
    let relative_dir = relative_display_path(&e.location.scope);
    let line_number = e.location.start_pos.line_number as usize;

    match e.error_type {
        ErrorType::Syntax => {
            if !relative_dir.is_empty() {
                say!("\n(╯°□°)╯  🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥  Σ(°△°;) ");
            }
            say!(Red "Malformed document");
        }

        ErrorType::Facts => {
            if !relative_dir.is_empty() {
                say!("\n(ಠ_ಠ) ", Dark Magenta relative_dir);
            }
            say!(Red "Semantic facts");
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::UnsupportedOperator | ErrorType::UnsupportedConversion => {
            if !relative_dir.is_empty() {
                say!("\nヽ(˶°o°)ﾉ  🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥  ╰(°□°╰) ");
            }
            say!(Red { error_type_to_str(&e.error_type) });
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::File => {
            say!(Yellow "🏚 Can't find/read file or directory: ", relative_dir);
            say!(e.msg);
            return;
        }

        ErrorType::Compiler => {
            if !relative_dir.is_empty() {
                say!("\nヽ༼☉ ‿ ⚆༽ﾉ  🔥🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥🔥  ╰(° _ o╰) ");
            }
            say!(Yellow "CONVERTER BUG - ");
            say!(Dark Yellow "not a problem with your document");
        }

        ErrorType::Config => {
            if !relative_dir.is_empty() {
                say!("\n (-_-)  🔥🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥🔥  <(^~^)/ ");
            }
            say!(Yellow "CONFIG FILE ISSUE - ");
            say!(Dark Yellow "Malformed config file, something doesn't make sense inside xconv.toml");
        }
    }

    if let Some(member) = e.metadata.get(&ErrorMetaDataKey::MemberName) {
        say!(Dark Magenta "In member ", Bright member);
    }

    say!(Red e.msg);

    if let Some(suggestion) = e.metadata.get(&ErrorMetaDataKey::PrimarySuggestion) {
        say!(Green "Suggestion: ", suggestion);
    }
}

/// Machine-readable diagnostics for `--json`.
pub fn diagnostics_json(document: &str, messages: &CompilerMessages) -> Value {
    let errors: Vec<Value> = messages.errors.iter().map(error_json).collect();
    let warnings: Vec<Value> = messages.warnings.iter().map(warning_json).collect();

    json!({
        "document": document,
        "errors": errors,
        "warnings": warnings,
    })
}

fn error_json(error: &CompilerError) -> Value {
    let mut metadata = Map::new();
    for (key, value) in &error.metadata {
        metadata.insert(format!("{key:?}"), Value::String(value.to_owned()));
    }

    json!({
        "kind": error.error_type,
        "message": error.msg,
        "location": error.location,
        "metadata": metadata,
    })
}

fn warning_json(warning: &CompilerWarning) -> Value {
    json!({
        "kind": warning.warning_kind,
        "message": warning.msg,
        "location": warning.location,
    })
}
