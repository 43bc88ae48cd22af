//! Plugin protocol types
//!
//! Plugins communicate via JSON messages over stdin/stdout.
//! Each plugin must support the `--manifest` flag to declare the identifier
//! type it validates.

use serde::{Deserialize, Serialize};

use crate::domain::{IdentifierType, Severity};

/// Plugin manifest declaring capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin name (e.g., "pidcheck-isbn")
    pub name: String,

    /// Plugin version
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Identifier type the plugin validates
    #[serde(rename = "type")]
    pub identifier_type: IdentifierType,
}

/// A message sent to a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRequest {
    /// The operation to perform
    pub operation: String,

    /// Operation-specific parameters
    pub params: serde_json::Value,
}

impl PluginRequest {
    pub fn new(operation: impl Into<String>, params: impl Into<serde_json::Value>) -> Self {
        Self {
            operation: operation.into(),
            params: params.into(),
        }
    }

    /// Builds a `validate` request
    pub fn validate(input: &str, ty: &IdentifierType) -> Self {
        Self::new(
            "validate",
            serde_json::json!({
                "input": input,
                "type": ty,
            }),
        )
    }
}

/// How bad a plugin-reported failure is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginSeverity {
    Invalid,
    #[default]
    Indeterminate,
}

impl From<PluginSeverity> for Severity {
    fn from(severity: PluginSeverity) -> Self {
        match severity {
            PluginSeverity::Invalid => Severity::DefinitiveInvalid,
            PluginSeverity::Indeterminate => Severity::Indeterminate,
        }
    }
}

/// A response from a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginResponse {
    /// Whether the identifier was confirmed
    pub success: bool,

    /// Error message (if failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Failure severity (if failure); missing means indeterminate
    #[serde(default)]
    pub severity: PluginSeverity,
}

impl PluginResponse {
    pub fn error(message: impl Into<String>, severity: PluginSeverity) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            severity,
        }
    }
}
