//! Plugin lifecycle CLI commands
//!
//! Each command runs a single reconcile against a descriptor file and, for
//! apply/remove, persists the resulting status even when the call failed.

use super::status_store::StatusFile;
use crate::config::Config;
use crate::engine::{HelmCliEngine, HelmCommand, ReleaseStorage};
use crate::models::PluginDescriptor;
use crate::reconciler::PluginReconciler;
use crate::source::LocalSourceResolver;
use anyhow::{Context, Result};
use clap::Subcommand;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Plugin subcommands
#[derive(Subcommand, Debug)]
pub enum PluginCommand {
    /// Render the plugin manifest without applying it
    Template {
        /// Plugin descriptor YAML file
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },

    /// Install or upgrade a plugin
    Apply {
        /// Plugin descriptor YAML file
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Status file read before and written after the reconcile
        #[arg(short, long)]
        status: PathBuf,

        /// Preview only, regardless of the descriptor
        #[arg(long)]
        dry_run: bool,
    },

    /// Uninstall a plugin
    Remove {
        /// Plugin descriptor YAML file
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Status file read before and written after the reconcile
        #[arg(short, long)]
        status: PathBuf,

        /// Preview only, regardless of the descriptor
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a stored plugin status
    Status {
        /// Status file
        #[arg(short, long)]
        status: PathBuf,
    },
}

/// Handle plugin CLI commands
pub async fn handle_plugin_command(command: PluginCommand, config: &Config) -> Result<()> {
    tracing::debug!("Handling plugin command: {:?}", command);

    match command {
        PluginCommand::Template { file } => {
            let plugin = load_descriptor(&file, config, false)?;
            let reconciler = build_reconciler(config).await?;
            let manifest = reconciler
                .template(&plugin)
                .await
                .with_context(|| format!("Failed to template plugin '{}'", plugin.name))?;
            std::io::stdout()
                .write_all(&manifest)
                .context("Failed to write manifest")?;
        }
        PluginCommand::Apply {
            file,
            status,
            dry_run,
        } => {
            let plugin = load_descriptor(&file, config, dry_run)?;
            let store = StatusFile::new(status);
            let mut current = store.load()?;
            let reconciler = build_reconciler(config).await?;

            let result = reconciler.apply(&plugin, &mut current).await;
            store.save(&current)?;
            print_status(&current)?;
            result.with_context(|| format!("Failed to apply plugin '{}'", plugin.name))?;
        }
        PluginCommand::Remove {
            file,
            status,
            dry_run,
        } => {
            let plugin = load_descriptor(&file, config, dry_run)?;
            let store = StatusFile::new(status);
            let mut current = store.load()?;
            let reconciler = build_reconciler(config).await?;

            let result = reconciler.remove(&plugin, &mut current).await;
            store.save(&current)?;
            print_status(&current)?;
            result.with_context(|| format!("Failed to remove plugin '{}'", plugin.name))?;
        }
        PluginCommand::Status { status } => {
            let current = StatusFile::new(status).load()?;
            print_status(&current)?;
        }
    }

    Ok(())
}

/// Wire the Helm-backed collaborators into a reconciler
pub async fn build_reconciler(config: &Config) -> Result<PluginReconciler> {
    let client = crate::kube::create_client(&config.helm).await?;
    let helm = HelmCommand::new(&config.helm);

    let resolver = LocalSourceResolver::new(config.cache_dir.clone(), config.search_dirs.clone())
        .with_helm(helm.clone());
    let engine = HelmCliEngine::new(helm, ReleaseStorage::new(client), config.helm.wait);

    Ok(PluginReconciler::new(Arc::new(resolver), Arc::new(engine)))
}

/// Read a descriptor file, filling in the default namespace
pub fn load_descriptor(path: &Path, config: &Config, force_dry_run: bool) -> Result<PluginDescriptor> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plugin file: {}", path.display()))?;
    let mut plugin: PluginDescriptor = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse plugin file: {}", path.display()))?;

    if plugin.name.is_empty() {
        anyhow::bail!("Plugin file {} has no name", path.display());
    }
    if plugin.namespace.is_empty() {
        plugin.namespace = config.default_namespace.clone();
    }
    // Relative chart paths are relative to the descriptor file
    if let Some(chart) = plugin.path.take() {
        plugin.path = Some(match path.parent() {
            Some(dir) if chart.is_relative() => dir.join(chart),
            _ => chart,
        });
    }
    plugin.dry_run |= force_dry_run;

    Ok(plugin)
}

fn print_status(status: &crate::models::PluginStatus) -> Result<()> {
    let yaml = serde_yaml::to_string(status).context("Failed to serialize status")?;
    print!("{}", yaml);
    Ok(())
}
