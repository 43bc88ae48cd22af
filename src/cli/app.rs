//! Main CLI application structure

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{plugin_cmd, validate_cmd};
use crate::config::Config;
use crate::logging;
use crate::plugin::PluginLoader;
use crate::registry::LazyRegistry;
use crate::validator::StatusClient;

#[derive(Parser)]
#[command(name = "pidcheck")]
#[command(author, version, about = "Checks that persistent identifiers are well-formed and resolvable")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./pidcheck.toml, then the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory scanned for validator plugins
    #[arg(long, global = true, env = "PIDCHECK_PLUGIN_DIR")]
    pub plugin_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List identifier types that can be validated
    Types,

    /// Validate one identifier
    Validate {
        /// Identifier type (HANDLE, DOI, URL or a plugin type)
        #[arg(long = "type", short = 't')]
        type_name: String,

        /// The identifier
        input: String,
    },

    /// Validate one identifier per line of a file
    Check {
        /// Identifier type (HANDLE, DOI, URL or a plugin type)
        #[arg(long = "type", short = 't')]
        type_name: String,

        /// Number of worker threads
        #[arg(long, short = 'j', default_value = "4")]
        jobs: usize,

        /// File with one identifier per line (`-` for stdin)
        path: PathBuf,
    },

    /// Manage validator plugins
    #[command(subcommand)]
    Plugin(plugin_cmd::PluginCommands),
}

/// Parses arguments and runs the selected command
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let output = Output::new(cli.format, cli.verbose);
    let config = Config::load(cli.config.as_deref())?.with_plugin_dir(cli.plugin_dir);
    output.verbose(&format!("Plugin directory: {}", config.plugins.dir.display()));

    let loader = PluginLoader::new(&config.plugins.dir).with_timeout(config.plugins.timeout());

    match cli.command {
        Commands::Types => {
            let registry = build_registry(&config, loader)?;
            let registry = registry.get();

            if output.is_json() {
                let items: Vec<_> = registry
                    .iter()
                    .map(|(ty, v)| serde_json::json!({ "type": ty, "validator": v.name() }))
                    .collect();
                output.data(&items);
            } else {
                for (ty, validator) in registry.iter() {
                    output.row(&[ty.to_string().as_str(), validator.name().as_str()]);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate { type_name, input } => {
            let registry = build_registry(&config, loader)?;
            validate_cmd::validate(registry.get(), &output, &type_name, &input)
        }

        Commands::Check {
            type_name,
            jobs,
            path,
        } => {
            let registry = build_registry(&config, loader)?;
            validate_cmd::check(registry.get(), &output, &type_name, &path, jobs)
        }

        Commands::Plugin(cmd) => plugin_cmd::run(cmd, &loader, &output),
    }
}

fn build_registry(config: &Config, loader: PluginLoader) -> Result<LazyRegistry<PluginLoader>> {
    let http = StatusClient::new(&config.http).context("Failed to build HTTP client")?;
    Ok(LazyRegistry::new(loader, http, config.handle.clone()))
}
