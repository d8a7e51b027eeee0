//! Plugin lifecycle reconciler
//!
//! Drives install, upgrade and removal of a plugin through the source
//! resolver and deployment engine, and records the outcome in a
//! [`PluginStatus`]. The reconciler keeps no state between calls; the
//! control loop serializes calls per plugin and persists the status after
//! every call, whether or not it returned an error.

pub mod error;
pub mod manifest;
pub mod timestamp;

pub use error::{DocumentFailure, ManifestParseError, ReconcileError};
pub use manifest::split_manifest;
pub use timestamp::{normalize, normalize_opt};

use crate::engine::{ApplyOptions, ChartEngine, RemoveOptions};
use crate::models::{PluginDescriptor, PluginPhase, PluginStatus, ReleaseStatus, ResourceRef};
use crate::source::SourceResolver;
use std::sync::Arc;

/// Message recorded when there is nothing installed to remove
pub const NOT_INSTALLED_MESSAGE: &str = "plugin not install";

/// Reconciles plugin descriptors against their recorded status
#[derive(Clone)]
pub struct PluginReconciler {
    resolver: Arc<dyn SourceResolver>,
    engine: Arc<dyn ChartEngine>,
}

impl PluginReconciler {
    pub fn new(resolver: Arc<dyn SourceResolver>, engine: Arc<dyn ChartEngine>) -> Self {
        Self { resolver, engine }
    }

    /// Render the plugin's manifest without applying anything
    ///
    /// Always a dry run, whatever the descriptor says.
    pub async fn template(&self, plugin: &PluginDescriptor) -> Result<Vec<u8>, ReconcileError> {
        let path = self.resolver.resolve(plugin).await?;

        let options = ApplyOptions {
            version: plugin.version.clone(),
            repo: plugin.repo.clone(),
            dry_run: true,
        };
        let release = self
            .engine
            .apply(&plugin.name, &plugin.namespace, &path, &plugin.values, &options)
            .await
            .map_err(ReconcileError::Render)?;

        Ok(release.manifest.into_bytes())
    }

    /// Install or upgrade the plugin, updating `status` in place
    pub async fn apply(
        &self,
        plugin: &PluginDescriptor,
        status: &mut PluginStatus,
    ) -> Result<(), ReconcileError> {
        let path = self.resolver.resolve(plugin).await?;

        let options = ApplyOptions {
            version: plugin.version.clone(),
            repo: plugin.repo.clone(),
            dry_run: plugin.dry_run,
        };
        let release = self
            .engine
            .apply(&plugin.name, &plugin.namespace, &path, &plugin.values, &options)
            .await
            .map_err(ReconcileError::Apply)?;

        // Preview of the intended end state, recorded even on dry run
        status.resources = resources_from(&release.manifest);

        if plugin.dry_run {
            tracing::debug!(
                "Dry run apply of {}/{} rendered {} resource(s)",
                plugin.namespace,
                plugin.name,
                status.resources.len()
            );
            return Ok(());
        }

        if !release.is_deployed() {
            status.notes = release.info.notes;
            tracing::warn!(
                "Plugin {}/{} not deployed yet: status={}, {}",
                plugin.namespace,
                plugin.name,
                release.info.status.as_str(),
                release.info.description
            );
            return Err(if release.info.status == ReleaseStatus::Failed {
                ReconcileError::ApplyFailed(release.info.description)
            } else {
                ReconcileError::ApplyNotFinished(release.info.description)
            });
        }

        let version = release.chart_version().to_string();
        status.name = release.name;
        status.namespace = release.namespace;
        status.phase = Some(PluginPhase::Installed);
        status.message = release.info.description;
        status.version = version;
        status.creation_timestamp = normalize_opt(release.info.first_deployed);
        status.upgrade_timestamp = normalize_opt(release.info.last_deployed);
        status.notes = release.info.notes;
        status.values = release.config;

        tracing::info!(
            "Plugin {}/{} installed at version {}",
            status.namespace,
            status.name,
            status.version
        );
        Ok(())
    }

    /// Uninstall the plugin, updating `status` in place
    pub async fn remove(
        &self,
        plugin: &PluginDescriptor,
        status: &mut PluginStatus,
    ) -> Result<(), ReconcileError> {
        match status.phase {
            Some(PluginPhase::None) => {
                tracing::debug!("Plugin {}/{} already removed", plugin.namespace, plugin.name);
                return Ok(());
            }
            None => {
                mark_not_installed(status);
                return Ok(());
            }
            Some(PluginPhase::Installed | PluginPhase::Removed) => {}
        }

        let options = RemoveOptions {
            dry_run: plugin.dry_run,
        };
        let release = self
            .engine
            .remove(&plugin.name, &plugin.namespace, &options)
            .await
            .map_err(ReconcileError::Remove)?;

        let Some(release) = release else {
            tracing::info!(
                "Plugin {}/{} has no installed release",
                plugin.namespace,
                plugin.name
            );
            mark_not_installed(status);
            return Ok(());
        };

        status.resources = resources_from(&release.manifest);

        if plugin.dry_run {
            return Ok(());
        }

        status.phase = Some(PluginPhase::Removed);
        status.message = release.info.description;
        status.deletion_timestamp = normalize_opt(release.info.deleted);
        status.notes = release.info.notes;
        status.values = release.config;

        tracing::info!("Plugin {}/{} removed", plugin.namespace, plugin.name);
        Ok(())
    }
}

fn mark_not_installed(status: &mut PluginStatus) {
    status.phase = Some(PluginPhase::None);
    status.message = NOT_INSTALLED_MESSAGE.to_string();
}

/// Split a release manifest, logging (not propagating) parse failures
fn resources_from(manifest: &str) -> Vec<ResourceRef> {
    let (resources, error) = split_manifest(manifest);
    if let Some(e) = error {
        tracing::warn!("Ignoring unparsable manifest documents: {}", e);
    }
    resources
}
