//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Explicit config file (`--config`), or the root config file
    /// 3. Built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => {
                let root = paths::root_config_path();
                if root.exists() {
                    Self::load_file(&root)?
                } else {
                    Self::load_defaults()
                }
            }
        };

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    pub fn validate(explicit: Option<&Path>) -> Result<()> {
        let config = Self::load(explicit).context("Failed to load configuration")?;

        if config.helm.binary.trim().is_empty() {
            return Err(anyhow::anyhow!("helm.binary must not be empty"));
        }
        if config.helm.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("helm.timeoutSeconds must be greater than 0"));
        }
        config
            .logger
            .level
            .parse::<tracing_subscriber::EnvFilter>()
            .with_context(|| format!("Invalid logger.level: {}", config.logger.level))?;

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(cache_dir) = std::env::var("PLUGIN_INSTALLER_CACHE_DIR") {
            config.cache_dir = PathBuf::from(cache_dir);
        }

        if let Ok(binary) = std::env::var("PLUGIN_INSTALLER_HELM_BINARY") {
            config.helm.binary = binary;
        }

        if let Ok(context) = std::env::var("PLUGIN_INSTALLER_KUBE_CONTEXT") {
            config.helm.kube_context = Some(context).filter(|c| !c.is_empty());
        }

        if let Ok(level) = std::env::var("PLUGIN_INSTALLER_LOG_LEVEL") {
            config.logger.level = level;
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.default_namespace, "default");
        assert_eq!(config.helm.binary, "helm");
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "defaultNamespace: plugins\nhelm:\n  timeoutSeconds: 60\n").unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.default_namespace, "plugins");
        assert_eq!(config.helm.timeout_seconds, 60);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(ConfigLoader::load(Some(&tmp.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.search_dirs.push(PathBuf::from("/opt/charts"));

        ConfigLoader::save(&config, &path).unwrap();
        let loaded = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "helm:\n  timeoutSeconds: 0\n").unwrap();
        assert!(ConfigLoader::validate(Some(&path)).is_err());
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
        // These variables are only read by this test.
        unsafe {
            std::env::set_var("PLUGIN_INSTALLER_HELM_BINARY", "/opt/helm/bin/helm");
            std::env::set_var("PLUGIN_INSTALLER_KUBE_CONTEXT", "kind-test");
        }

        let config = ConfigLoader::apply_env_overrides(Config::default());

        assert_eq!(config.helm.binary, "/opt/helm/bin/helm");
        assert_eq!(config.helm.kube_context.as_deref(), Some("kind-test"));

        // SAFETY: see above.
        unsafe {
            std::env::remove_var("PLUGIN_INSTALLER_HELM_BINARY");
            std::env::remove_var("PLUGIN_INSTALLER_KUBE_CONTEXT");
        }
    }
}
