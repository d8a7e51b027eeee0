//! Configuration system for plugin-installer
//!
//! Layered YAML configuration: built-in defaults, the root config file (or an
//! explicit `--config` file), then environment variable overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, HelmConfig, LoggerConfig};

use std::path::PathBuf;

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "cacheDir" => Ok(config.cache_dir.display().to_string()),
        "searchDirs" => Ok(config
            .search_dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(",")),
        "defaultNamespace" => Ok(config.default_namespace.clone()),
        "helm.binary" => Ok(config.helm.binary.clone()),
        "helm.timeoutSeconds" => Ok(config.helm.timeout_seconds.to_string()),
        "helm.kubeContext" => Ok(config.helm.kube_context.clone().unwrap_or_default()),
        "helm.kubeconfig" => Ok(config
            .helm
            .kubeconfig
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()),
        "helm.wait" => Ok(config.helm.wait.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "cacheDir" => {
            config.cache_dir = PathBuf::from(value);
        }
        "searchDirs" => {
            // Comma-separated list
            config.search_dirs = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        "defaultNamespace" => {
            config.default_namespace = value.to_string();
        }
        "helm.binary" => {
            config.helm.binary = value.to_string();
        }
        "helm.timeoutSeconds" => {
            config.helm.timeout_seconds = value
                .parse()
                .context("helm.timeoutSeconds must be a number")?;
        }
        "helm.kubeContext" => {
            config.helm.kube_context = Some(value.to_string()).filter(|v| !v.is_empty());
        }
        "helm.kubeconfig" => {
            config.helm.kubeconfig = Some(PathBuf::from(value)).filter(|_| !value.is_empty());
        }
        "helm.wait" => {
            config.helm.wait = value
                .parse()
                .context("helm.wait must be 'true' or 'false'")?;
        }
        "logger.level" => {
            config.logger.level = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
