//! Handle and DOI validator
//!
//! Validation happens in two stages:
//!
//! 1. **Shape**: the input must be `prefix/suffix` (optionally behind a
//!    `hdl://` or `doi:` scheme), or an `http(s)://host/prefix/suffix` URL.
//!    Prefix and suffix are restricted to ASCII alphanumerics and dots.
//! 2. **Resolution**: `GET {server}/{prefix}/{suffix}` must return 200, where
//!    the server is the URL's host or the Handle API by default. If it does
//!    not, `GET {prefix_server}/{prefix}` decides between "prefix exists but
//!    suffix could not be confirmed" (indeterminate) and "prefix unknown"
//!    (definitive).
//!
//! A network failure is never reported as a definitive rejection.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::http::StatusClient;
use super::{Validator, INVALID_INPUT};
use crate::domain::{Confirmed, IdentifierType, Validation, ValidationFailure};

pub(crate) const PREFIX_ONLY: &str = "prefix valid, but suffix not";
pub(crate) const PREFIX_UNPROVABLE: &str = "prefix not provable on handle.net";
const PREFIX_UNREACHABLE: &str = "could not reach handle.net to check the prefix";

pub const DEFAULT_API_SERVER: &str = "http://hdl.handle.net/api/handles";
pub const DEFAULT_PREFIX_SERVER: &str = "https://hdl.handle.net/0.NA";

#[allow(clippy::expect_used)]
static SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(hdl://|http://|https://|doi:)(.+)").expect("static regex should not panic")
});

#[allow(clippy::expect_used)]
static HTTP_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(http|https)://(.+)/([A-Za-z0-9.]+)/([A-Za-z0-9.]+)$")
        .expect("static regex should not panic")
});

#[allow(clippy::expect_used)]
static BARE_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9.]+)/([A-Za-z0-9.]+)$").expect("static regex should not panic")
});

/// Resolution endpoints used by [`HandleValidator`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleServers {
    /// Full lookups for bare and `hdl://`/`doi:` handles: `{api_server}/{prefix}/{suffix}`
    pub api_server: String,

    /// Prefix-only fallback: `{prefix_server}/{prefix}`
    pub prefix_server: String,
}

impl Default for HandleServers {
    fn default() -> Self {
        Self {
            api_server: DEFAULT_API_SERVER.to_string(),
            prefix_server: DEFAULT_PREFIX_SERVER.to_string(),
        }
    }
}

/// Where and what to look up
#[derive(Debug, Clone, PartialEq, Eq)]
struct HandleTarget {
    server: String,
    prefix: String,
    suffix: String,
}

/// Built-in validator for `HANDLE` and `DOI`
///
/// Both types share the Handle System, so one implementation serves both;
/// each instance is bound to the type it was created for.
#[derive(Debug, Clone)]
pub struct HandleValidator {
    ty: IdentifierType,
    http: StatusClient,
    servers: HandleServers,
}

impl HandleValidator {
    pub fn new(ty: IdentifierType, http: StatusClient, servers: HandleServers) -> Self {
        Self { ty, http, servers }
    }

    /// Extracts server, prefix and suffix from the input
    fn parse(&self, input: &str) -> Result<HandleTarget, ValidationFailure> {
        let Some(caps) = SCHEME.captures(input) else {
            return self.parse_bare(input);
        };

        match &caps[1] {
            "http://" | "https://" => Self::parse_http(input),
            _ => self.parse_bare(&caps[2]),
        }
    }

    fn parse_http(url: &str) -> Result<HandleTarget, ValidationFailure> {
        let caps = HTTP_FORM
            .captures(url)
            .ok_or_else(|| ValidationFailure::invalid(INVALID_INPUT))?;

        Ok(HandleTarget {
            server: format!("{}://{}", &caps[1], &caps[2]),
            prefix: caps[3].to_string(),
            suffix: caps[4].to_string(),
        })
    }

    fn parse_bare(&self, handle: &str) -> Result<HandleTarget, ValidationFailure> {
        let caps = BARE_FORM
            .captures(handle)
            .ok_or_else(|| ValidationFailure::invalid(INVALID_INPUT))?;

        Ok(HandleTarget {
            server: self.servers.api_server.clone(),
            prefix: caps[1].to_string(),
            suffix: caps[2].to_string(),
        })
    }

    /// Full lookup, then the prefix-only fallback
    fn resolve(&self, target: &HandleTarget) -> Validation {
        debug!(server = %target.server, prefix = %target.prefix, suffix = %target.suffix, "Resolving handle");

        let full = format!(
            "{}/{}/{}",
            target.server.trim_end_matches('/'),
            target.prefix,
            target.suffix
        );
        match self.http.get_status(&full) {
            Ok(status) if status == StatusCode::OK => {
                info!(prefix = %target.prefix, suffix = %target.suffix, "The handle is valid");
                return Ok(Confirmed);
            }
            Ok(status) => {
                warn!(url = %full, status = status.as_u16(), "Either the suffix or the prefix might be invalid, checking prefix");
            }
            Err(e) => {
                warn!(url = %full, error = %e, "Full lookup failed, checking prefix");
            }
        }

        self.resolve_prefix(&target.prefix)
    }

    fn resolve_prefix(&self, prefix: &str) -> Validation {
        let url = format!(
            "{}/{}",
            self.servers.prefix_server.trim_end_matches('/'),
            prefix
        );

        match self.http.get_status(&url) {
            Ok(status) if status == StatusCode::OK => {
                info!(prefix, "The prefix is valid");
                Err(ValidationFailure::indeterminate(PREFIX_ONLY))
            }
            Ok(status) => {
                error!(prefix, status = status.as_u16(), "The prefix is invalid");
                Err(ValidationFailure::invalid(PREFIX_UNPROVABLE))
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Please check if you have internet access");
                Err(ValidationFailure::indeterminate_with(PREFIX_UNREACHABLE, e))
            }
        }
    }
}

impl Validator for HandleValidator {
    fn supported_type(&self) -> IdentifierType {
        self.ty.clone()
    }

    fn check(&self, input: &str) -> Validation {
        let target = self.parse(input.trim())?;
        self.resolve(&target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::HttpSettings;
    use httpmock::prelude::*;

    fn http() -> StatusClient {
        StatusClient::new(&HttpSettings::default()).unwrap()
    }

    fn closed_port_base() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    fn validator_for(ty: IdentifierType, server: &MockServer) -> HandleValidator {
        HandleValidator::new(
            ty,
            http(),
            HandleServers {
                api_server: server.url("/api/handles"),
                prefix_server: server.url("/0.NA"),
            },
        )
    }

    /// Validator whose servers refuse connections
    fn offline_validator() -> HandleValidator {
        let base = closed_port_base();
        HandleValidator::new(
            IdentifierType::Handle,
            http(),
            HandleServers {
                api_server: format!("{}/api/handles", base),
                prefix_server: format!("{}/0.NA", base),
            },
        )
    }

    #[test]
    fn parses_bare_and_scheme_forms() {
        let validator = offline_validator();

        for input in ["10.1038/nphys1170", "hdl://10.1038/nphys1170", "doi:10.1038/nphys1170"] {
            let target = validator.parse(input).unwrap();
            assert_eq!(target.prefix, "10.1038");
            assert_eq!(target.suffix, "nphys1170");
            assert_eq!(target.server, validator.servers.api_server);
        }
    }

    #[test]
    fn parses_http_form() {
        let target = HandleValidator::parse_http("https://hdl.handle.net/api/handles/10.1038/nphys1170")
            .unwrap();

        assert_eq!(target.server, "https://hdl.handle.net/api/handles");
        assert_eq!(target.prefix, "10.1038");
        assert_eq!(target.suffix, "nphys1170");
    }

    #[test]
    fn rejects_malformed_input_without_network() {
        let validator = offline_validator();

        for input in [
            "not a handle",
            "test",
            "https://google.com",
            "hdl.handle/10.1038/nphys1170",
            "http://google.com/®¡“¢∂‚/®¡“¢∂‚",
            "10.1038/",
        ] {
            let err = validator.validate(input).unwrap_err();
            assert!(err.is_definitive(), "expected definitive for {input}");
            assert_eq!(err.message(), INVALID_INPUT, "input {input}");
        }
    }

    #[test]
    fn resolving_handle_is_confirmed() {
        let server = MockServer::start();
        let full = server.mock(|when, then| {
            when.method(GET).path("/api/handles/10.1038/nphys1170");
            then.status(200);
        });

        let validator = validator_for(IdentifierType::Handle, &server);

        assert_eq!(validator.validate("10.1038/nphys1170").unwrap(), Confirmed);
        full.assert();
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let server = MockServer::start();
        let full = server.mock(|when, then| {
            when.method(GET).path("/api/handles/10.1038/nphys1170");
            then.status(200);
        });

        let validator = validator_for(IdentifierType::Doi, &server);

        assert_eq!(validator.validate(" 10.1038/nphys1170\n").unwrap(), Confirmed);
        full.assert();
    }

    #[test]
    fn scheme_prefixes_resolve_the_same_way() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/handles/10.1038/nphys1170");
            then.status(200);
        });

        let validator = validator_for(IdentifierType::Doi, &server);

        assert!(validator.validate("hdl://10.1038/nphys1170").is_ok());
        assert!(validator.validate("doi:10.1038/nphys1170").is_ok());
    }

    #[test]
    fn http_form_uses_host_from_input() {
        let server = MockServer::start();
        let full = server.mock(|when, then| {
            when.method(GET).path("/resolver/10.1038/nphys1170");
            then.status(200);
        });

        let validator = offline_validator();
        let input = format!("{}/resolver/10.1038/nphys1170", server.base_url());

        assert!(validator.validate(&input).is_ok());
        full.assert();
    }

    #[test]
    fn prefix_only_match_is_indeterminate() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/0.NA/10.10.38");
            then.status(200);
        });

        let validator = validator_for(IdentifierType::Doi, &server);
        let err = validator
            .validate_as("10.10.38/nphys1170", &IdentifierType::Doi)
            .unwrap_err();

        assert!(err.is_indeterminate());
        assert_eq!(err.message(), PREFIX_ONLY);
    }

    #[test]
    fn full_lookup_server_error_falls_back() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/handles/10.1038/nphys1170.345678");
            then.status(500);
        });
        let prefix = server.mock(|when, then| {
            when.method(GET).path("/0.NA/10.1038");
            then.status(200);
        });

        let validator = validator_for(IdentifierType::Handle, &server);
        let err = validator.validate("10.1038/nphys1170.345678").unwrap_err();

        assert_eq!(err.message(), PREFIX_ONLY);
        prefix.assert();
    }

    #[test]
    fn unknown_prefix_is_definitive() {
        let server = MockServer::start();
        let validator = validator_for(IdentifierType::Handle, &server);

        let err = validator.validate("testdgsdfg/auifz8zhunjkad").unwrap_err();

        assert!(err.is_definitive());
        assert_eq!(err.message(), PREFIX_UNPROVABLE);
    }

    #[test]
    fn unreachable_host_falls_back_to_prefix_check() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/0.NA/10.1038");
            then.status(200);
        });

        let validator = validator_for(IdentifierType::Handle, &server);
        let input = format!("{}/10.1038/nphys1170", closed_port_base());
        let err = validator.validate(&input).unwrap_err();

        assert!(err.is_indeterminate());
        assert_eq!(err.message(), PREFIX_ONLY);
    }

    #[test]
    fn offline_is_never_definitive() {
        let err = offline_validator().validate("10.1038/nphys1170").unwrap_err();

        assert!(err.is_indeterminate());
        assert_eq!(err.message(), PREFIX_UNREACHABLE);
    }

    #[test]
    fn doi_instance_rejects_handle_type() {
        let server = MockServer::start();
        let validator = validator_for(IdentifierType::Doi, &server);

        let err = validator
            .validate_as("10.1038/nphys1170", &IdentifierType::Handle)
            .unwrap_err();

        assert!(err.is_indeterminate());
        assert_eq!(err.message(), crate::validator::ILLEGAL_TYPE);
    }

    #[test]
    fn repeated_calls_agree() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/0.NA/10.10.38");
            then.status(200);
        });

        let validator = validator_for(IdentifierType::Doi, &server);
        let kinds: Vec<_> = (0..3)
            .map(|_| validator.validate("10.10.38/nphys1170").unwrap_err().severity())
            .collect();

        assert!(kinds.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn default_servers() {
        let servers = HandleServers::default();

        assert_eq!(servers.api_server, "http://hdl.handle.net/api/handles");
        assert_eq!(servers.prefix_server, "https://hdl.handle.net/0.NA");
    }
}
