//! Validator registry
//!
//! Maps each [`IdentifierType`] to exactly one validator. Built once from
//! discovered plugins plus the built-ins, then read-only.
//!
//! ## Merge rule
//!
//! Plugins are installed first, built-ins last. Installing a type that is
//! already present replaces the earlier validator and moves the type to the
//! end, so `HANDLE`, `DOI` and `URL` always resolve to the built-ins and
//! always list after plugin-only types.
//!
//! ## Sharing
//!
//! A [`ValidatorRegistry`] is `Send + Sync` and needs no locking once built.
//! [`LazyRegistry`] defers the build to first use behind a [`OnceLock`], so
//! discovery runs exactly once even when many threads ask at the same time.

use std::sync::OnceLock;

use tracing::{info, warn};

use crate::domain::{IdentifierType, Validation, ValidationFailure};
use crate::plugin::PluginDiscovery;
use crate::validator::{self, HandleServers, StatusClient, Validator};

pub(crate) const NO_MATCH: &str = "no matching validator found";

/// Type-indexed lookup table of validators
#[derive(Debug, Default)]
pub struct ValidatorRegistry {
    entries: Vec<(IdentifierType, Box<dyn Validator>)>,
}

impl ValidatorRegistry {
    /// Discovers plugins, then installs the built-ins over them
    ///
    /// A discovery failure is logged and the registry continues with the
    /// built-ins alone.
    pub fn build(
        discovery: &dyn PluginDiscovery,
        http: &StatusClient,
        servers: &HandleServers,
    ) -> Self {
        let plugins = match discovery.discover() {
            Ok(plugins) => plugins,
            Err(e) => {
                info!(reason = %e, "No plugins loaded");
                Vec::new()
            }
        };

        Self::from_parts(plugins, validator::builtins(http, servers))
    }

    /// Merges plugin and built-in validators; built-ins win
    pub fn from_parts(
        plugins: Vec<Box<dyn Validator>>,
        builtins: Vec<Box<dyn Validator>>,
    ) -> Self {
        let mut registry = Self::default();

        for plugin in plugins {
            let ty = plugin.supported_type();
            if ty.is_builtin() {
                warn!(plugin = %plugin.name(), identifier_type = %ty, "Plugin claims a built-in type; the built-in validator takes precedence");
            }
            registry.install(plugin);
        }
        for builtin in builtins {
            registry.install(builtin);
        }

        registry
    }

    fn install(&mut self, validator: Box<dyn Validator>) {
        let ty = validator.supported_type();
        if let Some(pos) = self.entries.iter().position(|(t, _)| *t == ty) {
            let (_, replaced) = self.entries.remove(pos);
            info!(identifier_type = %ty, replaced = %replaced.name(), by = %validator.name(), "Validator replaced");
        }
        self.entries.push((ty, validator));
    }

    /// Returns the validator registered for `ty`
    pub fn lookup(&self, ty: &IdentifierType) -> Option<&dyn Validator> {
        self.entries
            .iter()
            .find(|(t, _)| t == ty)
            .map(|(_, v)| v.as_ref())
    }

    /// Validates `input` with the validator registered under `type_name`
    pub fn is_valid(&self, input: &str, type_name: &str) -> Validation {
        let validator = type_name
            .parse::<IdentifierType>()
            .ok()
            .and_then(|ty| self.lookup(&ty).map(|v| (ty, v)));

        let Some((ty, validator)) = validator else {
            warn!(type_name, "No matching validator found. Please check your input and plugins.");
            return Err(ValidationFailure::indeterminate(NO_MATCH));
        };

        let outcome = validator.validate_as(input, &ty);
        if outcome.is_ok() {
            info!(identifier_type = %ty, "Valid input and valid input type");
        }
        outcome
    }

    /// Registered type names, in registry order
    pub fn available_types(&self) -> Vec<String> {
        self.entries.iter().map(|(t, _)| t.to_string()).collect()
    }

    /// Iterates over `(type, validator)` pairs in registry order
    pub fn iter(&self) -> impl Iterator<Item = (&IdentifierType, &dyn Validator)> {
        self.entries.iter().map(|(t, v)| (t, v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A registry built on first use, exactly once
#[derive(Debug)]
pub struct LazyRegistry<D> {
    cell: OnceLock<ValidatorRegistry>,
    discovery: D,
    http: StatusClient,
    servers: HandleServers,
}

impl<D: PluginDiscovery> LazyRegistry<D> {
    pub fn new(discovery: D, http: StatusClient, servers: HandleServers) -> Self {
        Self {
            cell: OnceLock::new(),
            discovery,
            http,
            servers,
        }
    }

    /// Returns the registry, building it if this is the first call
    ///
    /// Concurrent callers block until the single build completes.
    pub fn get(&self) -> &ValidatorRegistry {
        self.cell
            .get_or_init(|| ValidatorRegistry::build(&self.discovery, &self.http, &self.servers))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}
