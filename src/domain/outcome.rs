//! Validation outcomes
//!
//! A validation either confirms the identifier or fails with one of two
//! severities:
//!
//! | Failure | Meaning |
//! |---------|---------|
//! | [`ValidationFailure::DefinitiveInvalid`] | The input is conclusively unusable |
//! | [`ValidationFailure::Indeterminate`] | Validity could not be confirmed, but is not ruled out |
//!
//! There is no "confirmed false": absence of confirmation is always a failure.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker for a confirmed identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmed;

/// Result of every validation call
pub type Validation = Result<Confirmed, ValidationFailure>;

type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Why an identifier could not be confirmed
#[derive(Debug, Error)]
pub enum ValidationFailure {
    /// Malformed syntax, a non-resolving identifier, or an unregistered prefix
    #[error("{message}")]
    DefinitiveInvalid { message: String },

    /// Network trouble, unknown type, type mismatch, or a prefix-only match
    #[error("{message}")]
    Indeterminate {
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

/// Failure severity, ordered `Indeterminate < DefinitiveInvalid`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Indeterminate,
    DefinitiveInvalid,
}

impl ValidationFailure {
    pub fn invalid(message: impl Into<String>) -> Self {
        ValidationFailure::DefinitiveInvalid {
            message: message.into(),
        }
    }

    pub fn indeterminate(message: impl Into<String>) -> Self {
        ValidationFailure::Indeterminate {
            message: message.into(),
            source: None,
        }
    }

    /// Indeterminate failure that keeps the underlying cause
    pub fn indeterminate_with(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        ValidationFailure::Indeterminate {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ValidationFailure::DefinitiveInvalid { .. } => Severity::DefinitiveInvalid,
            ValidationFailure::Indeterminate { .. } => Severity::Indeterminate,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationFailure::DefinitiveInvalid { message } => message,
            ValidationFailure::Indeterminate { message, .. } => message,
        }
    }

    pub fn is_definitive(&self) -> bool {
        self.severity() == Severity::DefinitiveInvalid
    }

    pub fn is_indeterminate(&self) -> bool {
        self.severity() == Severity::Indeterminate
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Indeterminate => "indeterminate",
            Severity::DefinitiveInvalid => "definitive_invalid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn definitive_outranks_indeterminate() {
        assert!(Severity::DefinitiveInvalid > Severity::Indeterminate);

        let worst = [Severity::Indeterminate, Severity::DefinitiveInvalid, Severity::Indeterminate]
            .into_iter()
            .max();
        assert_eq!(worst, Some(Severity::DefinitiveInvalid));
    }

    #[test]
    fn failure_exposes_message_and_severity() {
        let failure = ValidationFailure::invalid("invalid input");

        assert_eq!(failure.message(), "invalid input");
        assert_eq!(failure.to_string(), "invalid input");
        assert!(failure.is_definitive());
    }

    #[test]
    fn indeterminate_keeps_cause() {
        let cause = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let failure = ValidationFailure::indeterminate_with("server unreachable", cause);

        assert!(failure.is_indeterminate());
        let source = failure.source().expect("cause should be chained");
        assert!(source.to_string().contains("refused"));
    }

    #[test]
    fn plain_indeterminate_has_no_cause() {
        let failure = ValidationFailure::indeterminate("no matching validator found");

        assert!(failure.source().is_none());
        assert_eq!(failure.severity(), Severity::Indeterminate);
    }

    #[test]
    fn severity_serializes_snake_case() {
        let json = serde_json::to_string(&Severity::DefinitiveInvalid).unwrap();
        assert_eq!(json, "\"definitive_invalid\"");
    }
}
