//! Diagnostic logging
//!
//! Logs go to stderr so stdout stays clean for reports. `RUST_LOG` overrides
//! the default level.

use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "pidcheck=debug"
    } else {
        "pidcheck=warn"
    }
}

/// Installs the global subscriber
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let console = layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        assert_eq!(default_directive(false), "pidcheck=warn");
        assert_eq!(default_directive(true), "pidcheck=debug");
    }

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
    }
}
