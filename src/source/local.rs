//! Search-path and cache based resolver
//!
//! Lookup order:
//! 1. The descriptor's own `path`, if it exists
//! 2. Each search dir, then the cache dir: `<name>-<version>/`,
//!    `<name>-<version>.tgz`, then `<name>/` (version-checked via `Chart.yaml`)
//! 3. `helm pull` from the descriptor's repository into the cache dir

use super::{SourceError, SourceResolver};
use crate::engine::HelmCommand;
use crate::models::{ChartMetadata, PluginDescriptor};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use url::Url;

/// Resolves charts from local directories, pulling into a cache when missing
pub struct LocalSourceResolver {
    cache_dir: PathBuf,
    search_dirs: Vec<PathBuf>,
    helm: Option<HelmCommand>,
}

impl LocalSourceResolver {
    pub fn new(cache_dir: PathBuf, search_dirs: Vec<PathBuf>) -> Self {
        Self {
            cache_dir,
            search_dirs,
            helm: None,
        }
    }

    /// Enable pulling charts that are not available locally
    pub fn with_helm(mut self, helm: HelmCommand) -> Self {
        self.helm = Some(helm);
        self
    }

    /// Look for the chart in search dirs, then in the cache
    async fn find_local(&self, plugin: &PluginDescriptor) -> Option<PathBuf> {
        for dir in self.search_dirs.iter().chain(std::iter::once(&self.cache_dir)) {
            if let Some(path) = find_in_dir(dir, &plugin.name, &plugin.version).await {
                return Some(path);
            }
        }
        None
    }

    async fn pull(&self, plugin: &PluginDescriptor, helm: &HelmCommand) -> Result<PathBuf, SourceError> {
        let download_error = |reason: String| SourceError::Download {
            name: plugin.name.clone(),
            reason,
        };

        let target = self.cache_dir.join(cache_key(&plugin.name, &plugin.version));

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| download_error(e.to_string()))?;
        // Private per call; removed when dropped
        let staging = tempfile::Builder::new()
            .prefix(".pull-")
            .tempdir_in(&self.cache_dir)
            .map_err(|e| download_error(e.to_string()))?;

        let args = pull_args(&plugin.repo, &plugin.name, &plugin.version, staging.path())
            .map_err(download_error)?;

        tracing::info!(
            "Pulling chart {} {} from {}",
            plugin.name,
            plugin.version,
            plugin.repo
        );
        helm.run(&args)
            .await
            .map_err(|e| download_error(e.to_string()))?;

        // `--untar` unpacks into <staging>/<chart name>
        let unpacked = staging.path().join(&plugin.name);
        if !is_file(&unpacked.join("Chart.yaml")).await {
            return Err(download_error(format!(
                "pulled archive did not contain {}/Chart.yaml",
                plugin.name
            )));
        }

        // Another pull of the same chart may have finished first
        let target_chart = target.join("Chart.yaml");
        if is_file(&target_chart).await {
            return Ok(target);
        }
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&target)
                .await
                .map_err(|e| download_error(e.to_string()))?;
        }
        if let Err(e) = tokio::fs::rename(&unpacked, &target).await {
            if !is_file(&target_chart).await {
                return Err(download_error(e.to_string()));
            }
        }

        Ok(target)
    }
}

#[async_trait]
impl SourceResolver for LocalSourceResolver {
    async fn resolve(&self, plugin: &PluginDescriptor) -> Result<PathBuf, SourceError> {
        if let Some(path) = &plugin.path {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                tracing::debug!("Using plugin path {}", path.display());
                return Ok(path.clone());
            }
            tracing::debug!("Plugin path {} does not exist, searching", path.display());
        }

        if let Some(path) = self.find_local(plugin).await {
            tracing::debug!("Resolved plugin {} to {}", plugin.name, path.display());
            return Ok(path);
        }

        match &self.helm {
            Some(helm) if !plugin.repo.is_empty() => self.pull(plugin, helm).await,
            _ => Err(SourceError::NotFound(describe(plugin))),
        }
    }
}

fn describe(plugin: &PluginDescriptor) -> String {
    if plugin.version.is_empty() {
        plugin.name.clone()
    } else {
        format!("{}-{}", plugin.name, plugin.version)
    }
}

fn cache_key(name: &str, version: &str) -> String {
    if version.is_empty() {
        name.to_string()
    } else {
        format!("{}-{}", name, version)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

async fn find_in_dir(dir: &Path, name: &str, version: &str) -> Option<PathBuf> {
    if !version.is_empty() {
        let versioned = dir.join(format!("{}-{}", name, version));
        if is_file(&versioned.join("Chart.yaml")).await {
            return Some(versioned);
        }
        let archive = dir.join(format!("{}-{}.tgz", name, version));
        if is_file(&archive).await {
            return Some(archive);
        }
    }

    let plain = dir.join(name);
    let metadata = read_chart_metadata(&plain).await?;
    if version.is_empty() || metadata.version == version {
        Some(plain)
    } else {
        tracing::debug!(
            "Skipping {}: version {} does not match requested {}",
            plain.display(),
            metadata.version,
            version
        );
        None
    }
}

async fn read_chart_metadata(chart_dir: &Path) -> Option<ChartMetadata> {
    let contents = tokio::fs::read_to_string(chart_dir.join("Chart.yaml"))
        .await
        .ok()?;
    match serde_yaml::from_str(&contents) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            tracing::warn!("Invalid Chart.yaml in {}: {}", chart_dir.display(), e);
            None
        }
    }
}

/// Build `helm pull` arguments for an OCI or HTTP(S) repository
fn pull_args(repo: &str, name: &str, version: &str, dest: &Path) -> Result<Vec<OsString>, String> {
    let url = Url::parse(repo).map_err(|e| format!("invalid repository '{}': {}", repo, e))?;

    let mut args: Vec<OsString> = vec!["pull".into()];
    match url.scheme() {
        "oci" => {
            let reference = format!("{}/{}", repo.trim_end_matches('/'), name);
            args.push(reference.into());
        }
        "http" | "https" => {
            args.push(name.into());
            args.push("--repo".into());
            args.push(repo.into());
        }
        other => return Err(format!("unsupported repository scheme '{}'", other)),
    }
    if !version.is_empty() {
        args.push("--version".into());
        args.push(version.into());
    }
    args.push("--untar".into());
    args.push("--untardir".into());
    args.push(dest.into());
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_chart(dir: &Path, name: &str, version: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join("Chart.yaml"),
            format!("apiVersion: v2\nname: {}\nversion: {}\n", name, version),
        )
        .unwrap();
    }

    fn plugin(name: &str, version: &str) -> PluginDescriptor {
        PluginDescriptor {
            version: version.to_string(),
            ..PluginDescriptor::new(name, "ns1")
        }
    }

    #[tokio::test]
    async fn test_explicit_path_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let chart = tmp.path().join("anywhere");
        write_chart(&chart, "sample", "0.1.0");

        let resolver = LocalSourceResolver::new(tmp.path().join("cache"), vec![]);
        let mut descriptor = plugin("sample", "9.9.9");
        descriptor.path = Some(chart.clone());

        assert_eq!(resolver.resolve(&descriptor).await.unwrap(), chart);
    }

    #[tokio::test]
    async fn test_search_dirs_before_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let search = tmp.path().join("search");
        let cache = tmp.path().join("cache");
        write_chart(&search.join("sample-1.2.0"), "sample", "1.2.0");
        write_chart(&cache.join("sample-1.2.0"), "sample", "1.2.0");

        let resolver = LocalSourceResolver::new(cache, vec![search.clone()]);
        let path = resolver.resolve(&plugin("sample", "1.2.0")).await.unwrap();
        assert_eq!(path, search.join("sample-1.2.0"));
    }

    #[tokio::test]
    async fn test_archive_in_cache() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("sample-1.2.0.tgz"), b"archive").unwrap();

        let resolver = LocalSourceResolver::new(tmp.path().to_path_buf(), vec![]);
        let path = resolver.resolve(&plugin("sample", "1.2.0")).await.unwrap();
        assert_eq!(path, tmp.path().join("sample-1.2.0.tgz"));
    }

    #[tokio::test]
    async fn test_plain_dir_version_checked() {
        let tmp = tempfile::tempdir().unwrap();
        write_chart(&tmp.path().join("sample"), "sample", "1.0.0");
        let resolver = LocalSourceResolver::new(tmp.path().to_path_buf(), vec![]);

        let any = resolver.resolve(&plugin("sample", "")).await.unwrap();
        assert_eq!(any, tmp.path().join("sample"));

        let err = resolver.resolve(&plugin("sample", "2.0.0")).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(ref what) if what == "sample-2.0.0"));
    }

    #[tokio::test]
    async fn test_not_found_without_repo() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = LocalSourceResolver::new(tmp.path().to_path_buf(), vec![])
            .with_helm(HelmCommand::new(&Default::default()));
        let err = resolver.resolve(&plugin("missing", "")).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    /// A `helm` stand-in whose `pull` unpacks a minimal chart into `--untardir`
    #[cfg(unix)]
    fn fake_helm(dir: &Path) -> HelmCommand {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("helm");
        std::fs::write(
            &script,
            r#"#!/bin/sh
name="$2"
dest=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--untardir" ]; then dest="$2"; fi
  shift
done
mkdir -p "$dest/$name"
printf 'apiVersion: v2\nname: %s\nversion: 1.2.0\n' "$name" > "$dest/$name/Chart.yaml"
"#,
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        HelmCommand::new(&crate::config::HelmConfig {
            binary: script.display().to_string(),
            ..Default::default()
        })
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_concurrent_pulls_of_same_chart() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("cache");
        let resolver = LocalSourceResolver::new(cache.clone(), vec![]).with_helm(fake_helm(tmp.path()));

        let mut first = plugin("sample", "1.2.0");
        first.repo = "https://charts.example.com".to_string();
        let mut second = first.clone();
        second.namespace = "ns2".to_string();

        let (a, b) = tokio::join!(resolver.resolve(&first), resolver.resolve(&second));
        let expected = cache.join("sample-1.2.0");
        assert_eq!(a.unwrap(), expected);
        assert_eq!(b.unwrap(), expected);
        assert!(expected.join("Chart.yaml").is_file());

        // Staging dirs are cleaned up
        let leftovers: Vec<_> = std::fs::read_dir(&cache)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(".pull-"))
            .collect();
        assert!(leftovers.is_empty());

        // Later resolves hit the cache
        assert_eq!(resolver.resolve(&first).await.unwrap(), expected);
    }

    #[test]
    fn test_pull_args_http() {
        let args: Vec<String> = pull_args("https://charts.example.com", "sample", "1.2.0", Path::new("/c"))
            .unwrap()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "pull",
                "sample",
                "--repo",
                "https://charts.example.com",
                "--version",
                "1.2.0",
                "--untar",
                "--untardir",
                "/c"
            ]
        );
    }

    #[test]
    fn test_pull_args_oci() {
        let args: Vec<String> = pull_args("oci://registry.example.com/charts/", "sample", "", Path::new("/c"))
            .unwrap()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[1], "oci://registry.example.com/charts/sample");
        assert!(!args.contains(&"--version".to_string()));
    }

    #[test]
    fn test_pull_args_rejects_unknown_scheme() {
        assert!(pull_args("ftp://example.com", "sample", "", Path::new("/c")).is_err());
        assert!(pull_args("not a url", "sample", "", Path::new("/c")).is_err());
    }
}
