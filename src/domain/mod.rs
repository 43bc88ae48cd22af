//! Domain types for identifier validation
//!
//! Pure types without any I/O: identifier schemes, outcomes and reports.

mod identifier_type;
mod outcome;
mod report;

pub use identifier_type::{IdentifierType, IdentifierTypeError};
pub use outcome::{Confirmed, Severity, Validation, ValidationFailure};
pub use report::ValidationReport;
