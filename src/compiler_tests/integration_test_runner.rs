//! Runs the document cases under tests/cases.
//!
//! `success/` holds documents that must convert without errors; a `.expected` file next
//! to a document pins its exact output. `failure/` holds documents that must report at
//! least one error, either for a member or for the whole document.
use crate::conversion_core::compiler_errors::{CompilerMessages, error_type_to_str};
use crate::conversion_core::compiler_warnings::print_formatted_warning;
use crate::conversion_core::display_messages::print_formatted_error;
use crate::projects::batch::{self, DocumentInput, DocumentOutput};
use crate::settings::{Config, DOCUMENT_FILE_EXTENSION, EXPECTED_OUTPUT_EXTENSION};
use saying::say;
use std::fs;
use std::path::{Path, PathBuf};

pub const INTEGRATION_TESTS_PATH: &str = "tests/cases";
const SEPARATOR_LINE_LENGTH: usize = 37;

#[derive(Debug)]
pub enum CaseOutcome {
    Converted(DocumentOutput),

    // Converted, but the text differs from the pinned `.expected` output
    Mismatch {
        output: DocumentOutput,
        expected: String,
    },

    Failed(CompilerMessages),
}

impl CaseOutcome {
    /// Whether any error was reported, including member errors inside a converted document.
    pub fn has_errors(&self) -> bool {
        match self {
            CaseOutcome::Converted(output) | CaseOutcome::Mismatch { output, .. } => {
                output.failed_members() > 0
            }
            CaseOutcome::Failed(_) => true,
        }
    }
}

/// Every document in `directory`, sorted so runs are reproducible.
pub fn case_documents(directory: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(directory) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == DOCUMENT_FILE_EXTENSION))
        .collect();

    paths.sort();
    paths
}

/// Converts one case document and compares it with its `.expected` output, if it has one.
pub fn run_case(path: &Path, config: &Config) -> CaseOutcome {
    let document = match batch::load_document(path) {
        Ok(document) => document,
        Err(error) => {
            let mut messages = CompilerMessages::new();
            messages.errors.push(error);
            return CaseOutcome::Failed(messages);
        }
    };

    let input = DocumentInput {
        path: path.to_path_buf(),
        document,
    };

    let output = match batch::convert_document(&input, config) {
        Ok(output) => output,
        Err(messages) => return CaseOutcome::Failed(messages),
    };

    let expected_path = path.with_extension(EXPECTED_OUTPUT_EXTENSION);
    match fs::read_to_string(&expected_path) {
        // Checkouts on Windows may turn line endings into CRLF
        Ok(expected) if expected.replace("\r\n", "\n") != output.text => CaseOutcome::Mismatch {
            output,
            expected,
        },
        _ => CaseOutcome::Converted(output),
    }
}

/// Run all test cases from the tests/cases directory
pub fn run_all_test_cases(show_warnings: bool) {
    println!("Running all conversion test cases...\n");
    let timer = std::time::Instant::now();

    let test_cases_dir = Path::new(INTEGRATION_TESTS_PATH);
    let config = Config::default();

    let mut total_tests = 0;
    let mut passed_tests = 0;
    let mut failed_tests = 0;
    let mut expected_failures = 0;
    let mut unexpected_successes = 0;

    // Documents that should convert
    say!(Cyan "Testing documents that should convert:");
    println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));
    for path in case_documents(&test_cases_dir.join("success")) {
        total_tests += 1;
        println!("  {}", display_name(&path));

        match run_case(&path, &config) {
            CaseOutcome::Converted(output) if output.failed_members() == 0 => {
                say!(Green "✓ PASS");
                report_warnings(output.messages, show_warnings);
                passed_tests += 1;
            }
            CaseOutcome::Converted(output) => {
                say!(Red "✗ FAIL");
                failed_tests += 1;
                for error in output.messages.errors {
                    print_formatted_error(error);
                }
            }
            CaseOutcome::Mismatch { output, expected } => {
                say!(Red "✗ OUTPUT MISMATCH");
                failed_tests += 1;
                say!(Dark Magenta "Expected:");
                print!("{expected}");
                say!(Dark Magenta "Got:");
                print!("{}", output.text);
            }
            CaseOutcome::Failed(messages) => {
                say!(Red "✗ FAIL");
                failed_tests += 1;
                for error in messages.errors {
                    print_formatted_error(error);
                }
            }
        }

        println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));
    }

    println!();

    // Documents that should report errors
    say!(Cyan "Testing documents that should fail:");
    println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));
    for path in case_documents(&test_cases_dir.join("failure")) {
        total_tests += 1;
        println!("  {}", display_name(&path));

        let outcome = run_case(&path, &config);
        if !outcome.has_errors() {
            say!(Yellow "✗ UNEXPECTED SUCCESS");
            unexpected_successes += 1;
            println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));
            continue;
        }

        say!(Green "✓ EXPECTED FAILURE");
        expected_failures += 1;

        let messages = match outcome {
            CaseOutcome::Converted(output) | CaseOutcome::Mismatch { output, .. } => output.messages,
            CaseOutcome::Failed(messages) => messages,
        };

        for error in &messages.errors {
            say!(Yellow { error_type_to_str(&error.error_type) });
        }
        report_warnings(messages, show_warnings);

        println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));
    }

    println!();

    // Print summary
    println!("\n{}", "=".repeat(SEPARATOR_LINE_LENGTH));
    print!("Test Results Summary. Took: ");
    say!(Green #timer.elapsed());
    say!("  Total tests: ", Yellow total_tests);
    say!("  Successful conversions: ", Blue passed_tests);
    say!("  Failed conversions: ", Blue failed_tests);
    say!("  Expected failures: ", Blue expected_failures);
    say!("  Unexpected successes: ", Blue unexpected_successes);

    let correct_results = passed_tests + expected_failures;
    let incorrect_results = failed_tests + unexpected_successes;

    println!("\n  Correct results: {} / {}", correct_results, total_tests);
    println!("  Incorrect results: {} / {}", incorrect_results, total_tests);

    if incorrect_results == 0 {
        say!("\n🎉 All tests behaved as expected!");
    } else {
        let percentage = (correct_results as f64 / total_tests as f64) * 100.0;
        say!(Yellow "\n⚠ ", Bright Yellow format!("{:.1}", percentage), " %", Reset " of tests behaved as expected");
    }

    println!("{}", "=".repeat(SEPARATOR_LINE_LENGTH));
}

fn display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => path.to_string_lossy().to_string(),
    }
}

fn report_warnings(messages: CompilerMessages, show_warnings: bool) {
    if messages.warnings.is_empty() {
        return;
    }

    say!(Yellow "With ", messages.warnings.len().to_string(), " warnings");
    if show_warnings {
        for warning in messages.warnings {
            print_formatted_warning(warning);
        }
    }
}
