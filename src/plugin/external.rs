//! Validator backed by a plugin executable

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use super::loader::PluginLoader;
use super::protocol::{PluginManifest, PluginRequest};
use crate::domain::{Confirmed, IdentifierType, Severity, Validation, ValidationFailure};
use crate::validator::Validator;

/// Wraps a discovered plugin so it satisfies the [`Validator`] contract
///
/// Anything that goes wrong talking to the plugin is indeterminate: only the
/// plugin itself can declare an input definitively invalid.
#[derive(Debug, Clone)]
pub struct ExternalValidator {
    path: PathBuf,
    manifest: PluginManifest,
    timeout: Duration,
}

impl ExternalValidator {
    /// `timeout` bounds each call; a plugin that overruns it is killed
    pub fn new(path: impl Into<PathBuf>, manifest: PluginManifest, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            manifest,
            timeout,
        }
    }
}

impl Validator for ExternalValidator {
    fn supported_type(&self) -> IdentifierType {
        self.manifest.identifier_type.clone()
    }

    fn name(&self) -> String {
        self.manifest.name.clone()
    }

    fn check(&self, input: &str) -> Validation {
        let request = PluginRequest::validate(input, &self.manifest.identifier_type);
        debug!(plugin = %self.manifest.name, input, "Calling plugin");

        let response = PluginLoader::execute(&self.path, &request, self.timeout).map_err(|e| {
            warn!(plugin = %self.manifest.name, error = %format!("{:#}", e), "Plugin call failed");
            ValidationFailure::indeterminate(format!("plugin {} failed: {}", self.manifest.name, e))
        })?;

        if response.success {
            return Ok(Confirmed);
        }

        let message = response
            .error
            .unwrap_or_else(|| format!("rejected by plugin {}", self.manifest.name));

        Err(match Severity::from(response.severity) {
            Severity::DefinitiveInvalid => ValidationFailure::invalid(message),
            Severity::Indeterminate => ValidationFailure::indeterminate(message),
        })
    }
}
