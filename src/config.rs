//! Configuration handling for pidcheck
//!
//! Configuration is read from the first of: the `--config` path,
//! `./pidcheck.toml`, or `config.toml` in the user config directory.
//! Missing files fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validator::{HandleServers, HttpSettings};

/// Project-local configuration file name
pub const LOCAL_CONFIG: &str = "pidcheck.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Plugin discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Directory scanned for `pidcheck-*` executables
    pub dir: PathBuf,

    /// Limit for one plugin invocation, in seconds
    pub timeout_secs: u64,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./plugins"),
            timeout_secs: 10,
        }
    }
}

impl PluginsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Combined configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub plugins: PluginsConfig,
    pub http: HttpSettings,
    pub handle: HandleServers,
}

impl Config {
    /// Loads configuration, preferring `explicit` when given
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.is_file() {
            return Self::from_file(&local);
        }

        if let Some(path) = Self::global_config_dir().map(|d| d.join("config.toml")) {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Reads and validates a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Returns the user config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "pidcheck", "pidcheck").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Rejects settings the HTTP client cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http.connect_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.plugins.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "plugins.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }
        for (key, value) in [
            ("handle.api_server", &self.handle.api_server),
            ("handle.prefix_server", &self.handle.prefix_server),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }
        Ok(())
    }

    /// Overrides the plugin directory, e.g. from `--plugin-dir`
    pub fn with_plugin_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.plugins.dir = dir;
        }
        self
    }
}
