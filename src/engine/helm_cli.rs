//! Helm-backed [`ChartEngine`]

use super::{ApplyOptions, ChartEngine, EngineError, HelmCommand, ReleaseStorage, RemoveOptions};
use crate::models::{Release, ReleaseStatus, Values};
use async_trait::async_trait;
use chrono::Utc;
use std::ffi::OsString;
use std::path::Path;

/// Deployment engine that shells out to `helm`
///
/// Applies go through `helm upgrade --install -o json`; removals look the
/// current release up in Helm's storage first so that "nothing installed"
/// can be told apart from a failed uninstall.
pub struct HelmCliEngine {
    helm: HelmCommand,
    storage: ReleaseStorage,
    wait: bool,
}

impl HelmCliEngine {
    pub fn new(helm: HelmCommand, storage: ReleaseStorage, wait: bool) -> Self {
        Self {
            helm,
            storage,
            wait,
        }
    }
}

#[async_trait]
impl ChartEngine for HelmCliEngine {
    async fn apply(
        &self,
        name: &str,
        namespace: &str,
        path: &Path,
        values: &Values,
        options: &ApplyOptions,
    ) -> Result<Release, EngineError> {
        // Keep the file alive until helm has read it
        let values_file = tempfile::Builder::new()
            .prefix("plugin-values-")
            .suffix(".json")
            .tempfile()
            .map_err(EngineError::Values)?;
        let payload = serde_json::to_vec(values)?;
        tokio::fs::write(values_file.path(), payload)
            .await
            .map_err(EngineError::Values)?;

        let args = apply_args(name, namespace, path, values_file.path(), options, self.wait);
        let stdout = self.helm.run(&args).await?;
        let release: Release = serde_json::from_slice(&stdout)?;

        tracing::debug!(
            "helm apply {}/{}: status={}, revision={}, dry_run={}",
            release.namespace,
            release.name,
            release.info.status.as_str(),
            release.version,
            options.dry_run
        );

        Ok(release)
    }

    async fn remove(
        &self,
        name: &str,
        namespace: &str,
        options: &RemoveOptions,
    ) -> Result<Option<Release>, EngineError> {
        let Some(mut release) = self.storage.latest(name, namespace).await? else {
            tracing::debug!("No stored release for {}/{}", namespace, name);
            return Ok(None);
        };

        if release.info.status == ReleaseStatus::Uninstalled {
            tracing::debug!("Release {}/{} already uninstalled", namespace, name);
            return Ok(None);
        }

        let args = uninstall_args(name, namespace, options, self.wait);
        self.helm.run(&args).await?;

        if !options.dry_run {
            release.info.status = ReleaseStatus::Uninstalled;
            release.info.deleted = Some(Utc::now());
            release.info.description = "Uninstallation complete".to_string();
        }

        Ok(Some(release))
    }
}

fn apply_args(
    name: &str,
    namespace: &str,
    path: &Path,
    values_file: &Path,
    options: &ApplyOptions,
    wait: bool,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "upgrade".into(),
        name.into(),
        path.into(),
        "--install".into(),
    ];
    if !namespace.is_empty() {
        args.push("--namespace".into());
        args.push(namespace.into());
        args.push("--create-namespace".into());
    }
    args.push("--output".into());
    args.push("json".into());
    args.push("--values".into());
    args.push(values_file.into());
    if !options.version.is_empty() {
        args.push("--version".into());
        args.push(options.version.as_str().into());
    }
    if !options.repo.is_empty() {
        args.push("--repo".into());
        args.push(options.repo.as_str().into());
    }
    if options.dry_run {
        args.push("--dry-run".into());
    } else if wait {
        args.push("--wait".into());
    }
    args
}

fn uninstall_args(name: &str, namespace: &str, options: &RemoveOptions, wait: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["uninstall".into(), name.into()];
    if !namespace.is_empty() {
        args.push("--namespace".into());
        args.push(namespace.into());
    }
    if options.dry_run {
        args.push("--dry-run".into());
    } else if wait {
        args.push("--wait".into());
    }
    args
}
