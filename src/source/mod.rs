//! Plugin source resolution
//!
//! Turns a [`PluginDescriptor`] into a local chart the deployment engine can
//! render. The reconciler depends on the [`SourceResolver`] trait only.

mod local;

pub use local::LocalSourceResolver;

use crate::models::PluginDescriptor;
use async_trait::async_trait;
use std::path::PathBuf;

#[cfg(test)]
use mockall::automock;

/// Source resolution errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("plugin chart not found: {0}")]
    NotFound(String),

    #[error("failed to download plugin chart {name}: {reason}")]
    Download { name: String, reason: String },
}

/// Resolves a plugin to a local renderable package path
///
/// Implementations may block on registry I/O; dropping the returned future
/// must abandon the download.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve(&self, plugin: &PluginDescriptor) -> Result<PathBuf, SourceError>;
}
