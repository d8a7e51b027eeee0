//! Chart deployment engine
//!
//! The reconciler only talks to the [`ChartEngine`] trait. The shipped
//! implementation drives the `helm` binary and reads release history back out
//! of Helm's storage Secrets.

mod helm;
mod helm_cli;
mod storage;

pub use helm::HelmCommand;
pub use helm_cli::HelmCliEngine;
pub use storage::{ReleaseStorage, decode_release, decode_secret};

use crate::models::{Release, Values};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Options for rendering/applying a release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    pub version: String,
    pub repo: String,
    pub dry_run: bool,
}

/// Options for removing a release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    pub dry_run: bool,
}

/// Deployment engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {code}: {stderr}")]
    Command {
        command: String,
        code: String,
        stderr: String,
    },

    #[error("helm did not finish within {0:?}")]
    Timeout(Duration),

    #[error("failed to decode release: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to write values file: {0}")]
    Values(#[source] std::io::Error),

    #[error("invalid release data: {0}")]
    ReleaseData(String),

    #[error("release storage lookup failed: {0}")]
    Kube(#[from] kube::Error),
}

/// Renders, applies and removes releases
///
/// Implementations may block on network I/O. Dropping the returned future
/// must abandon the operation promptly. Implementations shared between
/// concurrent reconciliations must be safe for concurrent use.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChartEngine: Send + Sync {
    /// Install or upgrade `name` in `namespace` from the chart at `path`
    async fn apply(
        &self,
        name: &str,
        namespace: &str,
        path: &Path,
        values: &Values,
        options: &ApplyOptions,
    ) -> Result<Release, EngineError>;

    /// Uninstall `name`; `Ok(None)` means nothing was installed
    async fn remove(
        &self,
        name: &str,
        namespace: &str,
        options: &RemoveOptions,
    ) -> Result<Option<Release>, EngineError>;
}
