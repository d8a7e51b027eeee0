//! Helm release model
//!
//! Mirrors the JSON shape Helm uses both for `-o json` output and for the
//! payload of its storage Secrets. Only the fields the reconciler consumes
//! are modelled; everything else (chart templates, hooks, ...) is ignored.

use super::plugin::Values;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, versioned release as reported by the deployment engine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Release {
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    /// Release revision
    #[serde(default)]
    pub version: u32,

    #[serde(default)]
    pub info: ReleaseInfo,

    #[serde(default)]
    pub chart: Chart,

    /// Values the release was applied with
    #[serde(default)]
    pub config: Values,

    /// Rendered multi-document manifest
    #[serde(default)]
    pub manifest: String,
}

impl Release {
    /// Version of the chart this release was rendered from
    pub fn chart_version(&self) -> &str {
        &self.chart.metadata.version
    }

    pub fn is_deployed(&self) -> bool {
        self.info.status == ReleaseStatus::Deployed
    }
}

/// Release bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReleaseInfo {
    #[serde(default, with = "helm_time")]
    pub first_deployed: Option<DateTime<Utc>>,

    #[serde(default, with = "helm_time")]
    pub last_deployed: Option<DateTime<Utc>>,

    #[serde(default, with = "helm_time")]
    pub deleted: Option<DateTime<Utc>>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: ReleaseStatus,

    #[serde(default)]
    pub notes: String,
}

/// Helm release states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseStatus {
    Deployed,
    Uninstalled,
    Superseded,
    Failed,
    Uninstalling,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
    /// Any status this crate does not model; must stay last
    #[default]
    #[serde(other)]
    Unknown,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStatus::Unknown => "unknown",
            ReleaseStatus::Deployed => "deployed",
            ReleaseStatus::Uninstalled => "uninstalled",
            ReleaseStatus::Superseded => "superseded",
            ReleaseStatus::Failed => "failed",
            ReleaseStatus::Uninstalling => "uninstalling",
            ReleaseStatus::PendingInstall => "pending-install",
            ReleaseStatus::PendingUpgrade => "pending-upgrade",
            ReleaseStatus::PendingRollback => "pending-rollback",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Chart {
    #[serde(default)]
    pub metadata: ChartMetadata,
}

/// Chart metadata (the relevant subset of `Chart.yaml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_version: String,
}

/// Helm writes unset timestamps as an empty string
mod helm_time {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_str(&t.to_rfc3339()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => DateTime::parse_from_rfc3339(text)
                .map(|t| Some(t.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}
