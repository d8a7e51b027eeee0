//! Configuration command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::Path;

use crate::config::{ConfigLoader, paths};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "cacheDir", "helm.binary")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "cacheDir", "helm.binary")
        key: String,
        /// Configuration value
        value: String,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand, explicit: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load(explicit).context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = crate::config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => {
            let path = explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(paths::root_config_path);
            set_in_file(&path, &key, &value)?;
            println!("Configuration saved");
        }
        ConfigSubcommand::List => {
            let config = ConfigLoader::load(explicit).context("Failed to load configuration")?;

            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Path => {
            let config_path = explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(paths::root_config_path);
            println!("{}", config_path.display());
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::validate(explicit).context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

/// Update one key in a config file, leaving env overrides out of it
fn set_in_file(path: &Path, key: &str, value: &str) -> Result<()> {
    // Only a missing file starts from defaults; a broken one is an error
    let mut config = if path.exists() {
        ConfigLoader::load_file(path)?
    } else {
        ConfigLoader::load_defaults()
    };

    crate::config::set_config_value(&mut config, key, value)
        .with_context(|| format!("Failed to set {} = {}", key, value))?;

    ConfigLoader::save(&config, path).context("Failed to save configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_file_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "helm:\n  binary: /opt/helm\n").unwrap();

        set_in_file(&path, "helm.timeoutSeconds", "42").unwrap();

        let saved = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(saved.helm.timeout_seconds, 42);
        assert_eq!(saved.helm.binary, "/opt/helm");
        assert_eq!(saved.logger.level, "info");
    }

    #[test]
    fn test_set_refuses_to_overwrite_broken_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "helm: [not, a, mapping\n").unwrap();

        assert!(set_in_file(&path, "helm.binary", "helm3").is_err());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "helm: [not, a, mapping\n");
    }

    #[test]
    fn test_set_creates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");

        set_in_file(&path, "defaultNamespace", "plugins").unwrap();
        let saved = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(saved.default_namespace, "plugins");
    }
}
