//! Plugin descriptor and status types
//!
//! `PluginDescriptor` is the desired state handed to the reconciler on every
//! tick. `PluginStatus` is the recorded actual state that the reconciler
//! mutates in place and the caller persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Chart configuration values (keys are unique by construction)
pub type Values = serde_json::Map<String, serde_json::Value>;

/// Desired state of a plugin
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    /// Release name
    pub name: String,

    /// Target namespace
    #[serde(default)]
    pub namespace: String,

    /// Local chart location, if already known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Requested chart version (empty means latest / whatever is local)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Chart repository reference (`https://...` or `oci://...`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,

    /// Configuration values passed to the chart
    #[serde(default, skip_serializing_if = "Values::is_empty")]
    pub values: Values,

    /// Render and validate without committing anything
    #[serde(default)]
    pub dry_run: bool,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }
}

/// Lifecycle phase recorded in a plugin status
///
/// An unset phase (never reconciled) is represented by `Option::None` on
/// [`PluginStatus::phase`], which is distinct from `PluginPhase::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginPhase {
    /// Nothing installed
    None,
    Installed,
    Removed,
}

impl PluginPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginPhase::None => "None",
            PluginPhase::Installed => "Installed",
            PluginPhase::Removed => "Removed",
        }
    }
}

impl fmt::Display for PluginPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resource emitted by a rendered manifest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}/{}", self.kind, self.name)
        } else {
            write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
        }
    }
}

/// Recorded actual state of a plugin
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginStatus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// `None` until the first reconcile decides a phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PluginPhase>,

    /// Description of the last outcome
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Notes supplied by the deployment engine
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    /// Applied chart version
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Applied configuration values
    #[serde(default, skip_serializing_if = "Values::is_empty")]
    pub values: Values,

    /// Resources in manifest emission order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceRef>,

    /// First successful install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,

    /// Most recent successful apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_timestamp: Option<DateTime<Utc>>,

    /// Most recent successful removal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

impl PluginStatus {
    /// True if the status has never been through a reconcile
    pub fn is_unset(&self) -> bool {
        self.phase.is_none()
    }
}
