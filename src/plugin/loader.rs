//! Plugin discovery and loading
//!
//! Plugins are executables in the plugin directory whose file name starts
//! with `pidcheck-`. Each one is asked for its manifest and wrapped in an
//! [`ExternalValidator`].

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::external::ExternalValidator;
use super::protocol::{PluginManifest, PluginRequest, PluginResponse};
use super::PluginDiscovery;
use crate::domain::ValidationFailure;
use crate::validator::Validator;

/// File name prefix that marks a plugin executable
pub const PLUGIN_PREFIX: &str = "pidcheck-";

/// Information about a discovered plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Plugin name (file name of the executable)
    pub name: String,

    /// Path to the plugin executable
    pub path: PathBuf,
}

/// Default limit for one plugin invocation
const DEFAULT_PLUGIN_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Plugin loader and executor
#[derive(Debug, Clone)]
pub struct PluginLoader {
    plugin_dir: PathBuf,
    timeout: Duration,
}

impl PluginLoader {
    /// Creates a loader for the given plugin directory
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            timeout: DEFAULT_PLUGIN_TIMEOUT,
        }
    }

    /// Sets the limit for each manifest load and validation call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Lists plugin executables, sorted by name
    pub fn scan(&self) -> Result<Vec<PluginInfo>, ValidationFailure> {
        let dir = &self.plugin_dir;
        if dir.as_os_str().is_empty() {
            return Err(ValidationFailure::indeterminate("plugin directory not set"));
        }

        if !dir.is_dir() {
            return Err(ValidationFailure::indeterminate(format!(
                "plugin directory not found: {}",
                dir.display()
            )));
        }

        let entries = std::fs::read_dir(dir).map_err(|e| {
            ValidationFailure::indeterminate_with(
                format!("cannot read plugin directory: {}", dir.display()),
                e,
            )
        })?;

        let mut plugins = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();

            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with(PLUGIN_PREFIX) && is_executable(&path) {
                    plugins.push(PluginInfo {
                        name: name.to_string(),
                        path,
                    });
                }
            }
        }

        if plugins.is_empty() {
            return Err(ValidationFailure::indeterminate(format!(
                "no plugins found in {}",
                dir.display()
            )));
        }

        plugins.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(plugins)
    }

    /// Finds a plugin by name
    pub fn find(&self, name: &str) -> Result<Option<PluginInfo>, ValidationFailure> {
        Ok(self.scan()?.into_iter().find(|p| p.name == name))
    }

    /// Loads the manifest from a plugin
    pub fn load_manifest(path: &Path, timeout: Duration) -> Result<PluginManifest> {
        let output = run_plugin(path, &["--manifest"], None, timeout)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Plugin returned error: {}", stderr.trim());
        }

        let manifest: PluginManifest = serde_json::from_slice(&output.stdout)
            .with_context(|| "Failed to parse plugin manifest")?;

        Ok(manifest)
    }

    /// Executes a plugin request
    pub fn execute(path: &Path, request: &PluginRequest, timeout: Duration) -> Result<PluginResponse> {
        let request_json = serde_json::to_string(request).context("Failed to serialize request")?;
        let output = run_plugin(path, &[], Some(&request_json), timeout)?;

        if !output.status.success() {
            debug!(plugin = %path.display(), status = %output.status, "Plugin exited with failure");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let response_line = stdout
            .lines()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No response from plugin"))?;

        let response: PluginResponse =
            serde_json::from_str(response_line).context("Failed to parse plugin response")?;

        Ok(response)
    }
}

/// What a finished plugin process left behind
struct PluginOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Kills and reaps the child on every exit path
struct ChildGuard(Child);

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Ok(None) = self.0.try_wait() {
            let _ = self.0.kill();
        }
        let _ = self.0.wait();
    }
}

/// Runs a plugin to completion, killing it once `timeout` has passed
fn run_plugin(
    path: &Path,
    args: &[&str],
    input: Option<&str>,
    timeout: Duration,
) -> Result<PluginOutput> {
    let stdin = if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    };

    let child = Command::new(path)
        .args(args)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn plugin: {}", path.display()))?;
    let mut guard = ChildGuard(child);
    let deadline = Instant::now() + timeout;

    let stdout = guard
        .0
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("Failed to open plugin stdout"))?;
    let stderr = guard
        .0
        .stderr
        .take()
        .ok_or_else(|| anyhow::anyhow!("Failed to open plugin stderr"))?;
    let stdout = drain(stdout);
    let stderr = drain(stderr);

    // Send request, then close stdin so the plugin sees EOF
    if let Some(input) = input {
        let mut stdin = guard
            .0
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to open plugin stdin"))?;
        writeln!(stdin, "{}", input).context("Failed to write to plugin")?;
    }

    let status = loop {
        if let Some(status) = guard.0.try_wait().context("Failed to wait for plugin")? {
            break status;
        }
        if Instant::now() >= deadline {
            anyhow::bail!("Plugin timed out after {}s", timeout.as_secs_f32());
        }
        thread::sleep(POLL_INTERVAL);
    };

    // A grandchild may still hold the pipes open
    let grace = deadline
        .saturating_duration_since(Instant::now())
        .max(Duration::from_millis(100));
    let stdout = stdout
        .recv_timeout(grace)
        .context("Plugin output was not closed")?;
    let stderr = stderr.recv_timeout(grace).unwrap_or_default();

    Ok(PluginOutput {
        status,
        stdout,
        stderr,
    })
}

/// Reads a pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(mut pipe: R) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

impl PluginDiscovery for PluginLoader {
    fn discover(&self) -> Result<Vec<Box<dyn Validator>>, ValidationFailure> {
        let plugins = self.scan()?;
        let mut validators: Vec<Box<dyn Validator>> = Vec::with_capacity(plugins.len());

        for plugin in plugins {
            match Self::load_manifest(&plugin.path, self.timeout) {
                Ok(manifest) => {
                    debug!(plugin = %plugin.name, identifier_type = %manifest.identifier_type, "Loaded plugin manifest");
                    validators.push(Box::new(ExternalValidator::new(
                        plugin.path,
                        manifest,
                        self.timeout,
                    )));
                }
                Err(e) => {
                    warn!(plugin = %plugin.name, error = %format!("{:#}", e), "Can't load plugin");
                }
            }
        }

        if validators.is_empty() {
            return Err(ValidationFailure::indeterminate(format!(
                "no loadable validator plugins in {}",
                self.plugin_dir.display()
            )));
        }

        info!(count = validators.len(), dir = %self.plugin_dir.display(), "Discovered validator plugins");
        Ok(validators)
    }
}

/// Checks if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = path.metadata() {
            return meta.is_file() && meta.permissions().mode() & 0o111 != 0;
        }
    }

    #[cfg(windows)]
    {
        if let Some(ext) = path.extension() {
            return ext == "exe" || ext == "bat" || ext == "cmd";
        }
    }

    false
}
