//! Serializable summary of one validation, as shown to users

use serde::{Deserialize, Serialize};

use super::outcome::{Severity, Validation};

/// One validated identifier and what happened to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Type name as requested by the caller
    #[serde(rename = "type")]
    pub type_name: String,

    pub input: String,

    pub valid: bool,

    /// Failure severity (absent when valid)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    /// Failure message (empty when valid)
    pub message: String,
}

impl ValidationReport {
    pub fn new(type_name: impl Into<String>, input: impl Into<String>, outcome: &Validation) -> Self {
        let (valid, severity, message) = match outcome {
            Ok(_) => (true, None, String::new()),
            Err(failure) => (false, Some(failure.severity()), failure.message().to_string()),
        };

        Self {
            type_name: type_name.into(),
            input: input.into(),
            valid,
            severity,
            message,
        }
    }

    /// Single-line text rendering: `Valid input!`, `ERROR: ...` or `WARNING: ...`
    pub fn summary(&self) -> String {
        match self.severity {
            None => "Valid input!".to_string(),
            Some(Severity::DefinitiveInvalid) => format!("ERROR: {}", self.message),
            Some(Severity::Indeterminate) => format!("WARNING: {}", self.message),
        }
    }
}
