//! Plugin management commands

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use super::output::{exit_code, Output};
use crate::domain::ValidationReport;
use crate::plugin::{ExternalValidator, PluginLoader};
use crate::validator::Validator;

#[derive(Subcommand)]
pub enum PluginCommands {
    /// List plugins in the plugin directory
    List,

    /// Load a plugin's manifest and optionally validate a sample
    Test {
        /// Plugin name (e.g. pidcheck-isbn)
        name: String,

        /// Sample identifier to send to the plugin
        #[arg(long)]
        input: Option<String>,
    },
}

pub fn run(cmd: PluginCommands, loader: &PluginLoader, output: &Output) -> Result<ExitCode> {
    match cmd {
        PluginCommands::List => list_plugins(loader, output),
        PluginCommands::Test { name, input } => test_plugin(loader, output, &name, input.as_deref()),
    }
}

fn list_plugins(loader: &PluginLoader, output: &Output) -> Result<ExitCode> {
    let plugins = match loader.scan() {
        Ok(plugins) => plugins,
        Err(e) => {
            if output.is_json() {
                output.data(&Vec::<serde_json::Value>::new());
            } else {
                println!("No plugins found ({}).", e);
                println!();
                println!("Plugins are executables named '{}<name>' in the plugin directory.", crate::plugin::PLUGIN_PREFIX);
                println!("Set it with --plugin-dir, PIDCHECK_PLUGIN_DIR or [plugins] dir in pidcheck.toml.");
            }
            return Ok(ExitCode::SUCCESS);
        }
    };

    let rows: Vec<_> = plugins
        .iter()
        .map(|p| {
            let ty = PluginLoader::load_manifest(&p.path, loader.timeout())
                .map(|m| m.identifier_type.to_string())
                .ok();
            (p, ty)
        })
        .collect();

    if output.is_json() {
        let items: Vec<_> = rows
            .iter()
            .map(|(p, ty)| {
                serde_json::json!({
                    "name": p.name,
                    "type": ty,
                    "path": p.path.display().to_string(),
                })
            })
            .collect();
        output.data(&items);
    } else {
        println!("Available plugins:");
        println!("{:<30} {:<12} PATH", "NAME", "TYPE");
        println!("{}", "-".repeat(70));
        for (plugin, ty) in rows {
            println!(
                "{:<30} {:<12} {}",
                plugin.name,
                ty.as_deref().unwrap_or("?"),
                plugin.path.display()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn test_plugin(
    loader: &PluginLoader,
    output: &Output,
    name: &str,
    input: Option<&str>,
) -> Result<ExitCode> {
    let plugin = loader
        .find(name)?
        .ok_or_else(|| anyhow::anyhow!("Plugin not found: {}", name))?;

    let manifest = match PluginLoader::load_manifest(&plugin.path, loader.timeout()) {
        Ok(manifest) => manifest,
        Err(e) => {
            output.error(&format!("Plugin '{}' manifest failed: {:#}", name, e));
            return Ok(ExitCode::FAILURE);
        }
    };

    if !output.is_json() {
        println!("Plugin: {}", manifest.name);
        println!("Version: {}", manifest.version);
        println!("Description: {}", manifest.description);
        println!("Type: {}", manifest.identifier_type);
        println!();
    }

    let Some(input) = input else {
        if output.is_json() {
            output.data(&serde_json::json!({ "name": name, "manifest": manifest }));
        } else {
            output.success(&format!("Plugin '{}' is working correctly", name));
        }
        return Ok(ExitCode::SUCCESS);
    };

    let validator = ExternalValidator::new(plugin.path, manifest.clone(), loader.timeout());
    let outcome = validator.validate(input);
    let report = ValidationReport::new(manifest.identifier_type.to_string(), input, &outcome);

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": name,
            "manifest": manifest,
            "report": report,
        }));
    } else {
        output.report(&report, false);
    }

    Ok(exit_code(report.severity))
}
