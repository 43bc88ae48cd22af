//! Generic URL validator: a URL is valid when a `GET` returns 200

use reqwest::StatusCode;
use tracing::{debug, error, warn};

use super::http::StatusClient;
use super::Validator;
use crate::domain::{Confirmed, IdentifierType, Validation, ValidationFailure};

pub(crate) const INVALID_URL: &str = "invalid URL";
const UNREACHABLE: &str = "could not reach the server, check your internet connection";

/// Built-in validator for `URL`
#[derive(Debug, Clone)]
pub struct UrlValidator {
    http: StatusClient,
}

impl UrlValidator {
    pub fn new(http: StatusClient) -> Self {
        Self { http }
    }
}

impl Validator for UrlValidator {
    fn supported_type(&self) -> IdentifierType {
        IdentifierType::Url
    }

    fn check(&self, input: &str) -> Validation {
        debug!(url = input, "Validating URL");

        match self.http.get_status(input) {
            Ok(status) if status == StatusCode::OK => Ok(Confirmed),
            Ok(status) => {
                error!(url = input, status = status.as_u16(), "Invalid URL");
                Err(ValidationFailure::invalid(INVALID_URL))
            }
            Err(e) if e.is_malformed() => {
                warn!(url = input, error = %e, "Invalid URL");
                Err(ValidationFailure::invalid(INVALID_URL))
            }
            Err(e) => {
                warn!(url = input, error = %e, "Please check if you have internet access");
                Err(ValidationFailure::indeterminate_with(UNREACHABLE, e))
            }
        }
    }
}
