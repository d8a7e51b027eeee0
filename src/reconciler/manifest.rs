//! Manifest splitting
//!
//! Turns a rendered multi-document manifest into the ordered list of
//! resources it declares. A broken document never hides the others: every
//! document that parses is returned, and the ones that don't are collected
//! into an advisory [`ManifestParseError`].

use super::error::{DocumentFailure, ManifestParseError};
use crate::models::ResourceRef;
use serde_json::Value;

/// Split a multi-document manifest into resource descriptors
///
/// Documents are returned in emission order. Empty, whitespace-only and
/// comment-only documents are skipped silently.
pub fn split_manifest(manifest: &str) -> (Vec<ResourceRef>, Option<ManifestParseError>) {
    let mut resources = Vec::new();
    let mut failures = Vec::new();

    // Blank segments (e.g. before a leading `---`) don't count as documents
    let docs = documents(manifest).into_iter().filter(|doc| !is_blank(doc));

    for (index, doc) in docs.enumerate() {

        let value: Value = match serde_yaml::from_str(&doc) {
            Ok(value) => value,
            Err(e) => {
                failures.push(DocumentFailure {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        // e.g. a bare `~`
        if value.is_null() {
            continue;
        }

        match resource_ref(&value) {
            Ok(resource) => resources.push(resource),
            Err(reason) => failures.push(DocumentFailure { index, reason }),
        }
    }

    let error = if failures.is_empty() {
        None
    } else {
        Some(ManifestParseError { failures })
    };

    (resources, error)
}

/// Split on YAML document separator lines (`---`, optionally followed by a comment)
fn documents(manifest: &str) -> Vec<String> {
    let mut docs = Vec::new();
    let mut current = String::new();

    for line in manifest.lines() {
        if is_separator(line) {
            docs.push(std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    docs.push(current);

    docs
}

fn is_blank(doc: &str) -> bool {
    doc.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

fn is_separator(line: &str) -> bool {
    match line.strip_prefix("---") {
        Some(rest) => rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t'),
        None => false,
    }
}

fn resource_ref(value: &Value) -> Result<ResourceRef, String> {
    if !value.is_object() {
        return Err("document is not a mapping".to_string());
    }

    let kind = value
        .get("kind")
        .and_then(|k| k.as_str())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| "resource missing kind".to_string())?;

    let api_version = value
        .get("apiVersion")
        .and_then(|av| av.as_str())
        .filter(|av| !av.is_empty())
        .ok_or_else(|| format!("{} missing apiVersion", kind))?;

    let metadata = value.get("metadata");

    let name = metadata
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default();

    let namespace = metadata
        .and_then(|m| m.get("namespace"))
        .and_then(|n| n.as_str())
        .unwrap_or_default();

    Ok(ResourceRef {
        api_version: api_version.to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
        namespace: namespace.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELM_MANIFEST: &str = r#"---
# Source: sample/templates/serviceaccount.yaml
apiVersion: v1
kind: ServiceAccount
metadata:
  name: sample
  namespace: ns1
---
# Source: sample/templates/clusterrole.yaml
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRole
metadata:
  name: sample-reader
---
# Source: sample/templates/deployment.yaml
apiVersion: apps/v1
kind: Deployment
metadata:
  name: sample
  namespace: ns1
spec:
  replicas: 1
"#;

    #[test]
    fn test_split_preserves_emission_order() {
        let (resources, error) = split_manifest(HELM_MANIFEST);
        assert!(error.is_none());
        let kinds: Vec<&str> = resources.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, vec!["ServiceAccount", "ClusterRole", "Deployment"]);
        assert_eq!(resources[1].namespace, "");
        assert_eq!(resources[1].api_version, "rbac.authorization.k8s.io/v1");
        assert_eq!(resources[2].name, "sample");
    }

    #[test]
    fn test_empty_and_comment_only_documents_skipped() {
        let manifest = "---\n\n---\n# Source: empty.yaml\n---\n   \n";
        let (resources, error) = split_manifest(manifest);
        assert!(resources.is_empty());
        assert!(error.is_none());

        let (resources, error) = split_manifest("");
        assert!(resources.is_empty());
        assert!(error.is_none());
    }

    #[test]
    fn test_malformed_document_does_not_abort() {
        let manifest = r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: first
---
apiVersion: v1
kind: [unterminated
---
apiVersion: v1
kind: Secret
metadata:
  name: third
"#;
        let (resources, error) = split_manifest(manifest);
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].name, "first");
        assert_eq!(resources[1].name, "third");

        let error = error.expect("advisory error expected");
        assert_eq!(error.failures.len(), 1);
        assert_eq!(error.failures[0].index, 1);
    }

    #[test]
    fn test_document_without_kind_is_reported() {
        let manifest = "apiVersion: v1\nmetadata:\n  name: x\n---\n- just\n- a list\n";
        let (resources, error) = split_manifest(manifest);
        assert!(resources.is_empty());
        let error = error.unwrap();
        assert_eq!(error.failures.len(), 2);
        assert_eq!(error.failures[0].reason, "resource missing kind");
        assert_eq!(error.failures[1].reason, "document is not a mapping");
    }

    #[test]
    fn test_failure_index_ignores_blank_segments() {
        let (resources, error) = split_manifest("---\n---\nkind: [x\n");
        assert!(resources.is_empty());
        assert_eq!(error.unwrap().failures[0].index, 0);

        let manifest = "---\n# Source: a.yaml\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n---\n# Source: empty.yaml\n---\nkind: Deployment\n";
        let (resources, error) = split_manifest(manifest);
        assert_eq!(resources.len(), 1);
        let error = error.unwrap();
        assert_eq!(error.failures[0].index, 1);
        assert_eq!(error.failures[0].reason, "Deployment missing apiVersion");
    }

    #[test]
    fn test_separator_detection() {
        assert!(is_separator("---"));
        assert!(is_separator("--- # Source: x.yaml"));
        assert!(!is_separator("----"));
        assert!(!is_separator("key: ---"));
    }
}
