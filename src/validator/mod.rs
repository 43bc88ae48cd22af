//! # Validators
//!
//! The capability contract every validator implements, plus the built-in
//! validators.
//!
//! ## Contract
//!
//! - [`Validator::supported_type`] is constant for the lifetime of the
//!   validator; the registry uses it as the key.
//! - [`Validator::validate_as`] is the canonical entry point. Asking a
//!   validator to check a type it does not own fails `Indeterminate`
//!   before any work is done.
//! - Success is [`Confirmed`](crate::domain::Confirmed); there is no "false".
//!
//! ## Built-in Validators
//!
//! | Type | Validator | Check |
//! |------|-----------|-------|
//! | `HANDLE` | [`HandleValidator`] | Syntax + lookup on the Handle System |
//! | `DOI` | [`HandleValidator`] | Same as `HANDLE` |
//! | `URL` | [`UrlValidator`] | `GET` returns 200 |

mod handle;
mod http;
mod url;

pub use handle::{HandleServers, HandleValidator};
pub use http::{HttpSettings, StatusClient, StatusError};
pub use url::UrlValidator;

use tracing::warn;

use crate::domain::{IdentifierType, Validation, ValidationFailure};

pub(crate) const ILLEGAL_TYPE: &str = "illegal type of validator";
pub(crate) const INVALID_INPUT: &str = "invalid input";

/// A stateless validation capability bound to one identifier type
pub trait Validator: Send + Sync {
    /// The type this validator is registered under
    fn supported_type(&self) -> IdentifierType;

    /// Short human-readable name, for listings
    fn name(&self) -> String {
        format!("builtin:{}", self.supported_type())
    }

    /// Checks `input` as the supported type; callers go through [`Validator::validate_as`]
    fn check(&self, input: &str) -> Validation;

    /// Validates `input` as `ty`
    fn validate_as(&self, input: &str, ty: &IdentifierType) -> Validation {
        let supported = self.supported_type();
        if *ty != supported {
            warn!(requested = %ty, supported = %supported, "Illegal type of validator");
            return Err(ValidationFailure::indeterminate(ILLEGAL_TYPE));
        }

        if input.trim().is_empty() {
            return Err(ValidationFailure::invalid(INVALID_INPUT));
        }

        self.check(input)
    }

    /// Validates `input` as the validator's own type
    fn validate(&self, input: &str) -> Validation {
        self.validate_as(input, &self.supported_type())
    }
}

impl std::fmt::Debug for dyn Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name())
            .field("type", &self.supported_type())
            .finish()
    }
}

/// Creates the built-in validators in installation order
pub fn builtins(http: &StatusClient, servers: &HandleServers) -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(HandleValidator::new(IdentifierType::Handle, http.clone(), servers.clone())),
        Box::new(HandleValidator::new(IdentifierType::Doi, http.clone(), servers.clone())),
        Box::new(UrlValidator::new(http.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Confirmed;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingValidator {
        calls: AtomicUsize,
    }

    impl Validator for CountingValidator {
        fn supported_type(&self) -> IdentifierType {
            IdentifierType::Other("ISBN".to_string())
        }

        fn check(&self, _input: &str) -> Validation {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Confirmed)
        }
    }

    fn counting() -> CountingValidator {
        CountingValidator {
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn validate_uses_own_type() {
        let validator = counting();

        assert!(validator.validate("9783104996790").is_ok());
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn mismatched_type_is_indeterminate_and_skips_check() {
        let validator = counting();
        let err = validator
            .validate_as("9783104996790", &IdentifierType::Url)
            .unwrap_err();

        assert!(err.is_indeterminate());
        assert_eq!(err.message(), ILLEGAL_TYPE);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_input_is_definitive() {
        let validator = counting();
        let err = validator.validate("  ").unwrap_err();

        assert!(err.is_definitive());
        assert_eq!(err.message(), INVALID_INPUT);
    }

    #[test]
    fn builtins_cover_handle_doi_url() {
        let http = StatusClient::new(&HttpSettings::default()).unwrap();
        let types: Vec<_> = builtins(&http, &HandleServers::default())
            .iter()
            .map(|v| v.supported_type())
            .collect();

        assert_eq!(types, IdentifierType::BUILTIN.to_vec());
    }

    proptest! {
        #[test]
        fn foreign_types_never_confirm(name in "[A-Z][A-Z0-9_]{0,11}", input in ".{0,40}") {
            let ty: IdentifierType = name.parse().unwrap();
            prop_assume!(ty != IdentifierType::Other("ISBN".to_string()));

            let validator = counting();
            let result = validator.validate_as(&input, &ty);

            prop_assert!(matches!(result, Err(ref f) if f.is_indeterminate()));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn builtins_reject_foreign_types_without_network(name in "[A-Z][A-Z0-9_]{0,11}") {
            let ty: IdentifierType = name.parse().unwrap();
            let http = StatusClient::new(&HttpSettings::default()).unwrap();

            for validator in builtins(&http, &HandleServers::default()) {
                if validator.supported_type() == ty {
                    continue;
                }
                let result = validator.validate_as("10.1038/nphys1170", &ty);
                prop_assert!(matches!(result, Err(ref f) if f.is_indeterminate()));
            }
        }
    }
}
