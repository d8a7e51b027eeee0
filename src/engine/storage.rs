//! Helm release storage
//!
//! Helm stores each release revision in a Secret named
//! `sh.helm.release.v1.<name>.v<revision>` labelled `owner=helm,name=<name>`.
//! The `release` key holds base64 text of (usually gzipped) release JSON.

use super::EngineError;
use crate::models::Release;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, ListParams};

/// Reads release history out of Helm's storage Secrets
#[derive(Clone)]
pub struct ReleaseStorage {
    client: kube::Client,
}

impl ReleaseStorage {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// Latest stored revision of `name`, if any
    pub async fn latest(&self, name: &str, namespace: &str) -> Result<Option<Release>, EngineError> {
        let secrets: Api<Secret> = if namespace.is_empty() {
            Api::default_namespaced(self.client.clone())
        } else {
            Api::namespaced(self.client.clone(), namespace)
        };

        let selector = format!("owner=helm,name={}", name);
        let list = secrets.list(&ListParams::default().labels(&selector)).await?;

        tracing::debug!(
            "Found {} Helm storage Secret(s) for release {}/{}",
            list.items.len(),
            namespace,
            name
        );

        match list.items.iter().max_by_key(|secret| revision(secret)) {
            Some(secret) => decode_secret(secret).map(Some),
            None => Ok(None),
        }
    }
}

/// Revision number from the storage Secret's `version` label
fn revision(secret: &Secret) -> u32 {
    secret
        .metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get("version"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Decode the release held by a Helm storage Secret
pub fn decode_secret(secret: &Secret) -> Result<Release, EngineError> {
    let release_data = secret
        .data
        .as_ref()
        .and_then(|data| data.get("release"))
        .ok_or_else(|| EngineError::ReleaseData("Secret missing 'release' key".to_string()))?;

    decode_release(&release_data.0)
}

/// Decode a Helm release payload: base64 → gzip detection → decompress → JSON
pub fn decode_release(data: &[u8]) -> Result<Release, EngineError> {
    use base64::Engine;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| EngineError::ReleaseData(format!("invalid base64: {}", e)))?;

    // Check for gzip magic bytes (0x1f, 0x8b, 0x08)
    let is_gzipped =
        decoded.len() >= 3 && decoded[0] == 0x1f && decoded[1] == 0x8b && decoded[2] == 0x08;

    let decompressed = if is_gzipped {
        use std::io::Read;
        let mut decoder = flate2::read::GzDecoder::new(&decoded[..]);
        let mut buf = Vec::new();
        decoder
            .read_to_end(&mut buf)
            .map_err(|e| EngineError::ReleaseData(format!("invalid gzip data: {}", e)))?;
        buf
    } else {
        decoded
    };

    Ok(serde_json::from_slice(&decompressed)?)
}
