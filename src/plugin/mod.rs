//! # Plugin System
//!
//! Third-party validators for identifier types beyond the built-ins.
//!
//! ## Overview
//!
//! Plugins are separate binaries that communicate with pidcheck via JSON over
//! stdin/stdout. This makes plugins language-agnostic: any language can
//! implement a plugin.
//!
//! ## Plugin Discovery
//!
//! Plugins are executables named `pidcheck-{name}` in the plugin directory
//! (`./plugins` by default, see [`crate::config`]).
//!
//! ## Protocol
//!
//! ```text
//! pidcheck                     Plugin Binary
//!  │                               │
//!  ├── Spawn: pidcheck-isbn --manifest
//!  │   Stdout: {"name": "pidcheck-isbn", "version": "0.1.0", "type": "ISBN"}
//!  │                               │
//!  ├── Spawn: pidcheck-isbn        │
//!  ├── Stdin: {"operation": "validate", "params": {"input": "...", "type": "ISBN"}}
//!  └── Stdout: {"success": false, "error": "bad checksum", "severity": "invalid"}
//! ```
//!
//! ## Key Types
//!
//! - [`PluginDiscovery`] - Turns a plugin source into validators
//! - [`PluginLoader`] - Discovers and executes plugin binaries
//! - [`ExternalValidator`] - A plugin seen through the [`Validator`] contract
//! - [`PluginManifest`] - Declares the identifier type a plugin validates

mod external;
mod loader;
mod protocol;

pub use external::ExternalValidator;
pub use loader::{PluginInfo, PluginLoader, PLUGIN_PREFIX};
pub use protocol::{PluginManifest, PluginRequest, PluginResponse, PluginSeverity};

use crate::domain::ValidationFailure;
use crate::validator::Validator;

/// Source of plugin validators
///
/// Fails `Indeterminate` when the source is missing, blank, empty, or holds
/// no loadable validator.
pub trait PluginDiscovery {
    fn discover(&self) -> Result<Vec<Box<dyn Validator>>, ValidationFailure>;
}

/// Discovery that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlugins;

impl PluginDiscovery for NoPlugins {
    fn discover(&self) -> Result<Vec<Box<dyn Validator>>, ValidationFailure> {
        Err(ValidationFailure::indeterminate("plugin loading disabled"))
    }
}
