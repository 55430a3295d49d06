//! Command-line entrypoints for the converter.
//!
//! Parses commands and dispatches them into document conversion or the converter's own
//! case-folder test run.

use crate::compiler_tests::integration_test_runner::run_all_test_cases;
use crate::conversion_core::compiler_errors::CompilerMessages;
use crate::conversion_core::display_messages::{
    diagnostics_json, print_compiler_messages, print_formatted_error,
};
use crate::projects::batch::{self, DocumentInput};
use crate::settings::Config;
use saying::say;
use serde_json::json;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Convert {
        path: String,
        config: Option<String>,
        json: bool,
    },

    Help,
    ConverterTests, // Runs every case under tests/cases
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flag {
    DisableWarnings,
}

pub fn start_cli() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help(false);
        return;
    }

    let command = match get_command(&args[1..]) {
        Ok(command) => command,
        Err(e) => {
            say!(Red e);
            print_help(true);
            return;
        }
    };

    let flags = get_flags(&args);

    match command {
        Command::Help => print_help(false),

        Command::Convert { path, config, json } => {
            convert_file(Path::new(&path), config.as_deref(), json, &flags);
        }

        Command::ConverterTests => {
            run_all_test_cases(!flags.contains(&Flag::DisableWarnings));
        }
    }
}

fn convert_file(path: &Path, config_path: Option<&str>, as_json: bool, flags: &[Flag]) {
    // Without an explicit config, xconv.toml next to the document applies
    let config = match config_path {
        Some(config_path) => Config::load(Path::new(config_path)),
        None => Config::find_and_load(path.parent().unwrap_or(Path::new(""))),
    };

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            print_formatted_error(e);
            return;
        }
    };

    let document = match batch::load_document(path) {
        Ok(document) => document,
        Err(e) => {
            print_formatted_error(e);
            return;
        }
    };

    let input = DocumentInput {
        path: PathBuf::from(path),
        document,
    };

    let name = input.document.name.to_owned();
    let (output, imports, mut messages) = match batch::convert_document(&input, &config) {
        Ok(output) => (Some(output.text), output.imports, output.messages),
        Err(messages) => (None, Vec::new(), messages),
    };

    if flags.contains(&Flag::DisableWarnings) {
        messages.warnings.clear();
    }

    match as_json {
        true => print_json(&name, output.as_deref(), &imports, &messages),
        false => {
            if let Some(output) = output {
                print!("{output}");
            }
            print_compiler_messages(messages);
        }
    }
}

fn print_json(name: &str, output: Option<&str>, imports: &[String], messages: &CompilerMessages) {
    let result = json!({
        "document": name,
        "output": output,
        "imports": imports,
        "diagnostics": diagnostics_json(name, messages),
    });

    match serde_json::to_string_pretty(&result) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            let reason = e.to_string();
            say!(Red "Could not serialise the diagnostics: ", reason);
        }
    }
}

fn get_command(args: &[String]) -> Result<Command, String> {
    let command = args.first().map(String::as_str);

    match command {
        Some("help") => Ok(Command::Help),
        Some("tests") => Ok(Command::ConverterTests),
        Some("convert") => parse_convert_command(args),
        Some(other) => Err(format!("Invalid command: '{other}'")),
        None => Err(String::from("No command given")),
    }
}

fn get_flags(args: &[String]) -> Vec<Flag> {
    let mut flags = Vec::new();

    for arg in args {
        if arg.as_str() == "--hide-warnings" {
            flags.push(Flag::DisableWarnings);
        }
    }

    flags
}

fn parse_convert_command(args: &[String]) -> Result<Command, String> {
    let mut path = String::new();
    let mut config = None;
    let mut json = false;
    let mut index = 1usize;

    while let Some(arg) = args.get(index) {
        match arg.as_str() {
            "--config" => {
                let Some(value) = args.get(index + 1) else {
                    return Err(String::from("Missing value for --config"));
                };
                if value.starts_with("--") {
                    return Err(String::from("Missing value for --config"));
                }
                config = Some(value.to_owned());
                index += 2;
            }
            "--json" => {
                json = true;
                index += 1;
            }
            "--hide-warnings" => {
                index += 1;
            }
            _ if arg.starts_with("--") => {
                return Err(format!(
                    "Unknown convert flag: '{arg}'. Supported flags are --config, --json, --hide-warnings."
                ));
            }
            _ => {
                if !path.is_empty() {
                    return Err(String::from("Convert accepts exactly one document path."));
                }
                path = arg.to_owned();
                index += 1;
            }
        }
    }

    if path.is_empty() {
        return Err(String::from("Convert needs a document path: xconv convert <document.json>"));
    }

    Ok(Command::Convert { path, config, json })
}

fn print_help(commands_only: bool) {
    if !commands_only {
        say!(Bright Black "------------------------------------");
        say!(Green Bold "xconv - converts pre-analysed documents to the target language");
        say!("Usage: ", Bold "<command>", Italic " <args>");
    }
    say!(Green Bold "\nCommands:");
    say!("  convert <document.json>   - Converts one document and prints the result");
    say!("  tests                     - Runs every case under tests/cases");
    say!("  help                      - Shows this message");

    say!(Green Bold "\nConvert options:");
    say!("  --config <file>   (default: xconv.toml next to the document)");
    say!("  --json            Prints the output and structured diagnostics as JSON");

    say!(Green Bold "\nFlags:");
    say!("  --hide-warnings");
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
