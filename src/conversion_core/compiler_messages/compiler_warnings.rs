use crate::conversion_core::compiler_errors::TextLocation;
use saying::say;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct CompilerWarning {
    pub msg: String,
    pub location: TextLocation,
    pub warning_kind: WarningKind,
}

impl CompilerWarning {
    pub fn new(msg: impl Into<String>, location: TextLocation, warning_kind: WarningKind) -> Self {
        CompilerWarning {
            msg: msg.into(),
            location,
            warning_kind,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    // No type facts for a node, the target's own implicit conversion is trusted
    MissingFacts,

    // A call was wrapped into a local function to keep argument evaluation order
    CallWrappedInLocalFunction,

    // The type has no counterpart in the target type model
    UnmappedType,
}

pub fn print_formatted_warning(w: CompilerWarning) {
    say!(Yellow Bold "WARNING: ");
    match w.warning_kind {
        WarningKind::MissingFacts => {
            say!("No semantic facts for '", w.msg, "', left unconverted");
        }
        WarningKind::CallWrappedInLocalFunction => {
            say!("Call to '", w.msg, "' was moved into a local function");
        }
        WarningKind::UnmappedType => {
            say!("Type '", w.msg, "' has no target counterpart");
        }
    }
}
