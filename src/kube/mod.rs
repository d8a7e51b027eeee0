//! Kubernetes client module
//!
//! Builds the client used to read Helm release storage. Honors the same
//! kubeconfig file and context the `helm` invocations are configured with,
//! so both talk to the same cluster.

use crate::config::HelmConfig;
use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy unless a kubeconfig file or
/// context is configured:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client(helm: &HelmConfig) -> Result<Client> {
    let config = match (&helm.kubeconfig, &helm.kube_context) {
        (None, None) => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
        (kubeconfig_path, context) => {
            let options = KubeConfigOptions {
                context: context.clone(),
                ..Default::default()
            };
            match kubeconfig_path {
                Some(path) => {
                    let kubeconfig = Kubeconfig::read_from(path).with_context(|| {
                        format!("Failed to read kubeconfig: {}", path.display())
                    })?;
                    Config::from_custom_kubeconfig(kubeconfig, &options)
                        .await
                        .context("Failed to load kubeconfig")?
                }
                None => Config::from_kubeconfig(&options)
                    .await
                    .context("Failed to load kubeconfig")?,
            }
        }
    };

    tracing::debug!("Connecting to Kubernetes API at {}", config.cluster_url);

    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}
