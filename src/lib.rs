//! pidcheck - validation of persistent identifiers
//!
//! Checks that Handles, DOIs and URLs are well-formed and actually resolve,
//! and routes other identifier types to external validator plugins. Every
//! validation either confirms the identifier or fails as definitively
//! invalid or as indeterminate.

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod plugin;
pub mod registry;
pub mod validator;

pub use domain::{Confirmed, IdentifierType, Severity, Validation, ValidationFailure, ValidationReport};
pub use registry::{LazyRegistry, ValidatorRegistry};
pub use validator::Validator;
