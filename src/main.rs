//! plugin-installer - reconcile Helm-packaged cluster plugins
//!
//! Runs one reconcile (template, apply or remove) against a plugin
//! descriptor file and records the outcome in a status file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plugin_installer::cli::{self, ConfigSubcommand, PluginCommand};
use plugin_installer::config::ConfigLoader;
use std::path::PathBuf;

/// Reconcile Helm-packaged cluster plugins against their recorded status
#[derive(Parser, Debug)]
#[command(name = "plugin-installer", version)]
#[command(about = "Reconcile Helm-packaged cluster plugins against their recorded status", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Configuration file (defaults to the user config file)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Plugin(PluginCommand),

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        // Config commands must work even when the config file is broken
        Command::Config { subcommand } => {
            cli::handle_config_command(subcommand, args.config.as_deref())
        }
        Command::Plugin(command) => {
            let config = ConfigLoader::load(args.config.as_deref())
                .context("Failed to load configuration")?;
            cli::init_logging(&config.logger.level, args.debug, args.log_file.as_deref())?;

            tracing::debug!(
                "Configuration loaded: cacheDir={}, helm={}",
                config.cache_dir.display(),
                config.helm.binary
            );

            cli::handle_plugin_command(command, &config).await
        }
    }
}
