//! Blocking HTTP status client shared by the built-in validators

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Malformed URL '{url}': {source}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme '{scheme}' in '{url}'")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("Request to '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl StatusError {
    /// True when the URL itself is unusable, as opposed to the network
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            StatusError::Malformed { .. } | StatusError::UnsupportedScheme { .. }
        )
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Total request timeout in seconds
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            timeout_secs: 15,
            user_agent: format!("pidcheck/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Issues `GET` requests and reports the final status code
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct StatusClient {
    client: Client,
}

impl StatusClient {
    pub fn new(settings: &HttpSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// Sends a `GET` to `url` and returns the status of the final response
    pub fn get_status(&self, url: &str) -> Result<StatusCode, StatusError> {
        let parsed = Url::parse(url).map_err(|source| StatusError::Malformed {
            url: url.to_string(),
            source,
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StatusError::UnsupportedScheme {
                url: url.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }

        debug!(url, "GET");
        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(|source| StatusError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "HTTP status");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn http() -> StatusClient {
        StatusClient::new(&HttpSettings::default()).unwrap()
    }

    /// Returns a localhost URL with nothing listening on it
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    #[test]
    fn reports_status_code() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/ok");
            then.status(200);
        });

        let status = http().get_status(&server.url("/ok")).unwrap();

        assert_eq!(status, StatusCode::OK);
        mock.assert();
    }

    #[test]
    fn non_200_is_not_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let status = http().get_status(&server.url("/missing")).unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn malformed_url() {
        let err = http().get_status("hdl.handle/10.1038/nphys1170").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn unsupported_scheme() {
        let err = http().get_status("ftp://example.org/file").unwrap_err();
        assert!(matches!(err, StatusError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));
    }

    #[test]
    fn connection_refused_is_transport() {
        let err = http().get_status(&closed_port_url()).unwrap_err();

        assert!(matches!(err, StatusError::Transport { .. }));
        assert!(!err.is_malformed());
    }

    #[test]
    fn settings_defaults() {
        let settings = HttpSettings::default();

        assert_eq!(settings.connect_timeout_secs, 5);
        assert_eq!(settings.timeout_secs, 15);
        assert!(settings.user_agent.starts_with("pidcheck/"));
    }
}
