//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Where pulled charts are cached
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Directories searched for charts before the cache
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_dirs: Vec<PathBuf>,

    /// Namespace used when a plugin descriptor doesn't set one
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Helm invocation settings
    #[serde(default)]
    pub helm: HelmConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Helm invocation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelmConfig {
    /// Path or name of the helm binary
    #[serde(default = "default_helm_binary")]
    pub binary: String,

    /// Upper bound for a single helm invocation
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// kubeconfig context to use (current context when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_context: Option<String>,

    /// kubeconfig file (default loading rules when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    /// Wait for resources to become ready on apply/remove
    #[serde(default = "default_false")]
    pub wait: bool,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Default tracing filter (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_cache_dir() -> PathBuf {
    super::paths::cache_dir()
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_helm_binary() -> String {
    "helm".to_string()
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_false() -> bool {
    false
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            search_dirs: Vec::new(),
            default_namespace: default_namespace(),
            helm: HelmConfig::default(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            binary: default_helm_binary(),
            timeout_seconds: default_timeout_seconds(),
            kube_context: None,
            kubeconfig: None,
            wait: default_false(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
