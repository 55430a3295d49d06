//! Target-language backend.
//!
//! Holds the target syntax tree produced by lowering and prints it as readable
//! source. Parenthesisation is decided here, from operator precedence, so lowering
//! never has to think about it.

mod render;
pub mod target_expr;
pub mod target_statement;


pub use render::{escape_char, escape_string};

use crate::conversion_core::compiler_errors::TextLocation;
use crate::backends::target::target_statement::TargetStatement;

/// Configuration for printing target source.
#[derive(Debug, Clone)]
pub struct TargetOutputConfig {
    /// Emit indentation.
    pub pretty: bool,

    /// Emit source location comments.
    pub emit_locations: bool,
}

impl Default for TargetOutputConfig {
    fn default() -> Self {
        TargetOutputConfig {
            pretty: true,
            emit_locations: false,
        }
    }
}

/// One converted member. Failed members carry a single error marker statement.
#[derive(Debug, Clone)]
pub struct TargetMember {
    pub name: String,
    pub location: TextLocation,
    pub statements: Vec<TargetStatement>,
}

#[derive(Debug, Clone)]
pub struct TargetDocument {
    pub name: String,
    pub imports: Vec<String>,
    pub members: Vec<TargetMember>,
}

pub fn render_document(document: &TargetDocument, config: &TargetOutputConfig) -> String {
    let mut writer = TargetWriter::new(config.clone());

    for import in &document.imports {
        writer.emit_line(&format!("using {import};"));
    }

    for (index, member) in document.members.iter().enumerate() {
        if index > 0 || !document.imports.is_empty() {
            writer.emit_line("");
        }

        writer.emit_line(&format!("// {}", member.name));
        writer.emit_location_comment(&member.location);
        for statement in &member.statements {
            writer.write_statement(statement);
        }
    }

    writer.finish()
}

pub struct TargetWriter {
    config: TargetOutputConfig,
    out: String,
    indent: usize,
}

impl TargetWriter {
    pub fn new(config: TargetOutputConfig) -> Self {
        TargetWriter {
            config,
            out: String::new(),
            indent: 0,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub(crate) fn emit_line(&mut self, line: &str) {
        if self.config.pretty && !line.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
        }

        self.out.push_str(line);
        self.out.push('\n');
    }

    pub(crate) fn emit_location_comment(&mut self, location: &TextLocation) {
        if !self.config.emit_locations {
            return;
        }

        let line = location.start_pos.line_number + 1;
        let start = location.start_pos.char_column;
        let end = location.end_pos.char_column;
        self.emit_line(&format!("// source {}:{}-{}", line, start, end));
    }

    pub(crate) fn with_indent<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut Self),
    {
        self.indent += 1;
        callback(self);
        self.indent -= 1;
    }
}

/// Reserved words of the target language. Source identifiers that collide are escaped with `@`.
pub fn is_target_reserved(identifier: &str) -> bool {
    matches!(
        identifier,
        "abstract" | "as" | "base" | "bool" | "break" | "byte" | "case" | "catch" | "char"
            | "checked" | "class" | "const" | "continue" | "decimal" | "default" | "delegate"
            | "do" | "double" | "else" | "enum" | "event" | "explicit" | "extern" | "false"
            | "finally" | "fixed" | "float" | "for" | "foreach" | "goto" | "if" | "implicit"
            | "in" | "int" | "interface" | "internal" | "is" | "lock" | "long" | "namespace"
            | "new" | "null" | "object" | "operator" | "out" | "override" | "params"
            | "private" | "protected" | "public" | "readonly" | "ref" | "return" | "sbyte"
            | "sealed" | "short" | "sizeof" | "stackalloc" | "static" | "string" | "struct"
            | "switch" | "this" | "throw" | "true" | "try" | "typeof" | "uint" | "ulong"
            | "unchecked" | "unsafe" | "ushort" | "using" | "virtual" | "void" | "volatile"
            | "while"
    )
}

/// Maps a source identifier onto a valid target identifier.
pub fn sanitize_identifier(raw: &str) -> String {
    // Source identifiers may be bracket-escaped, e.g. `[Date]`
    let raw = raw
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(raw);

    let mut result = String::new();
    for ch in raw.chars() {
        // A leading digit is kept and prefixed below
        let is_valid = ch == '_' || ch.is_alphanumeric();

        match is_valid {
            true => result.push(ch),
            false => result.push('_'),
        }
    }

    if result.is_empty() {
        return String::from("_value");
    }

    if result.chars().next().is_some_and(|first| first.is_ascii_digit()) {
        return format!("_{result}");
    }

    match is_target_reserved(&result) {
        true => format!("@{result}"),
        false => result,
    }
}
