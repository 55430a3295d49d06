use crate::backends::target::TargetOutputConfig;
use crate::conversion_core::compiler_errors::{CharPosition, CompilerError, ErrorType, TextLocation};
use crate::return_config_error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "xconv.toml";
pub const DOCUMENT_FILE_EXTENSION: &str = "json";
pub const EXPECTED_OUTPUT_EXTENSION: &str = "expected";

// Where the late-binding helper classes (Conversions, Operators, LikeOperator) live
pub const DEFAULT_RUNTIME_NAMESPACE: &str = "Microsoft.VisualBasic.CompilerServices";

// Where the CompareMethod enum lives
pub const DEFAULT_SUPPORT_NAMESPACE: &str = "Microsoft.VisualBasic";

// Math.Pow
pub const SYSTEM_NAMESPACE: &str = "System";

/// How string comparisons treat case, as set by the source module's `Option Compare`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMethod {
    #[default]
    Binary,
    Text,
}

impl CompareMethod {
    pub fn is_text(self) -> bool {
        self == CompareMethod::Text
    }

    pub fn member_name(self) -> &'static str {
        match self {
            CompareMethod::Binary => "Binary",
            CompareMethod::Text => "Text",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonSettings {
    pub mode: CompareMethod,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub namespace: String,
    pub support_namespace: String,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        RuntimeSettings {
            namespace: String::from(DEFAULT_RUNTIME_NAMESPACE),
            support_namespace: String::from(DEFAULT_SUPPORT_NAMESPACE),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub pretty: bool,
    pub emit_locations: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            pretty: true,
            emit_locations: false,
        }
    }
}

/// Settings read from `xconv.toml`. Every section and key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub comparison: ComparisonSettings,
    pub runtime: RuntimeSettings,
    pub output: OutputSettings,
}

impl Config {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Config, CompilerError> {
        match toml::from_str::<Config>(text) {
            Ok(config) => Ok(config),
            Err(error) => {
                let mut location = TextLocation::new(
                    path.to_path_buf(),
                    CharPosition::default(),
                    CharPosition::default(),
                );

                // toml reports a byte span, turn its start into a line number
                if let Some(span) = error.span() {
                    let line = text[..span.start.min(text.len())].matches('\n').count();
                    location = TextLocation::new(
                        path.to_path_buf(),
                        CharPosition {
                            line_number: line as i32,
                            char_column: 0,
                        },
                        CharPosition {
                            line_number: line as i32,
                            char_column: 0,
                        },
                    );
                }

                Err(CompilerError::new(
                    format!("Invalid config: {}", error.message()),
                    location,
                    ErrorType::Config,
                ))
            }
        }
    }

    pub fn load(path: &Path) -> Result<Config, CompilerError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) => {
                return_config_error!(format!("Could not read config file: {error}"), path)
            }
        };

        Config::from_toml_str(&text, path)
    }

    /// Loads `xconv.toml` from `directory` when present, defaults otherwise.
    pub fn find_and_load(directory: &Path) -> Result<Config, CompilerError> {
        let path: PathBuf = directory.join(CONFIG_FILE_NAME);
        match path.is_file() {
            true => Config::load(&path),
            false => Ok(Config::default()),
        }
    }

    pub fn output_config(&self) -> TargetOutputConfig {
        TargetOutputConfig {
            pretty: self.output.pretty,
            emit_locations: self.output.emit_locations,
        }
    }
}
