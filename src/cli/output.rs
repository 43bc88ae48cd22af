//! Output formatting for CLI commands

use std::process::ExitCode;

use serde::Serialize;

use crate::domain::{Severity, ValidationReport};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Exit code for a run whose worst failure was `worst`
///
/// | Outcome | Code |
/// |---------|------|
/// | all confirmed | 0 |
/// | definitive invalid | 2 |
/// | indeterminate | 3 |
pub fn exit_code(worst: Option<Severity>) -> ExitCode {
    ExitCode::from(exit_status(worst))
}

fn exit_status(worst: Option<Severity>) -> u8 {
    match worst {
        None => 0,
        Some(Severity::DefinitiveInvalid) => 2,
        Some(Severity::Indeterminate) => 3,
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints an error message
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Error: {}", message),
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "success": false,
                        "error": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints one validation report
    ///
    /// `with_input` prefixes the text form with the input, for batch runs.
    pub fn report(&self, report: &ValidationReport, with_input: bool) {
        match self.format {
            OutputFormat::Text if with_input => println!("{}\t{}", report.input, report.summary()),
            OutputFormat::Text => println!("{}", report.summary()),
            OutputFormat::Json => self.data(report),
        }
    }

    /// Prints a table row (text only, ignored in JSON mode)
    pub fn row(&self, columns: &[&str]) {
        if self.format == OutputFormat::Text {
            println!("{}", columns.join("\t"));
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }
}
