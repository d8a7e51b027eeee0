//! File-backed plugin status persistence
//!
//! Stands in for the control loop's status storage when driving the
//! reconciler from the command line.

use crate::models::PluginStatus;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A plugin status stored as YAML on disk
pub struct StatusFile {
    path: PathBuf,
}

impl StatusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored status; a missing file is a never-reconciled plugin
    pub fn load(&self) -> Result<PluginStatus> {
        if !self.path.exists() {
            tracing::debug!("No status at {}, starting empty", self.path.display());
            return Ok(PluginStatus::default());
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read status file: {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(PluginStatus::default());
        }

        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse status file: {}", self.path.display()))
    }

    /// Atomically replace the stored status
    pub fn save(&self, status: &PluginStatus) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        crate::config::paths::ensure_dir(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let yaml = serde_yaml::to_string(status).context("Failed to serialize status")?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(yaml.as_bytes())
            .context("Failed to write status")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write status file: {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PluginPhase;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_missing_file_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StatusFile::new(tmp.path().join("status.yaml"));
        assert_eq!(store.load().unwrap(), PluginStatus::default());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StatusFile::new(tmp.path().join("sub").join("status.yaml"));
        let status = PluginStatus {
            name: "sample".to_string(),
            phase: Some(PluginPhase::Installed),
            creation_timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };

        store.save(&status).unwrap();
        assert_eq!(store.load().unwrap(), status);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("phase: Installed"));
        assert!(raw.contains("creationTimestamp:"));
        assert!(raw.contains("2024-01-01T00:00:00Z"));
    }
}
