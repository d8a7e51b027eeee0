//! Reconciliation errors
//!
//! Every error returned from the reconciler means "requeue me" to the control
//! loop; the variants tell it why. `ManifestParseError` is advisory only and
//! never returned from a reconcile call.

use crate::engine::EngineError;
use crate::source::SourceError;

/// Errors returned by [`PluginReconciler`](super::PluginReconciler)
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Chart package could not be located or fetched; status untouched
    #[error(transparent)]
    SourceResolution(#[from] SourceError),

    /// Preview rendering failed
    #[error("render failed: {0}")]
    Render(#[source] EngineError),

    /// Engine call for an apply failed outright; status untouched
    #[error("apply failed: {0}")]
    Apply(#[source] EngineError),

    /// Release applied but has not reached the deployed state yet
    #[error("apply not finished: {0}")]
    ApplyNotFinished(String),

    /// Engine reports the release as failed
    #[error("apply failed: release is in failed state: {0}")]
    ApplyFailed(String),

    /// Engine failed to remove the release; status untouched
    #[error("remove failed: {0}")]
    Remove(#[source] EngineError),
}

impl ReconcileError {
    /// Short stable name for logs and events
    pub fn kind(&self) -> &'static str {
        match self {
            ReconcileError::SourceResolution(_) => "SourceResolutionError",
            ReconcileError::Render(_) => "RenderError",
            ReconcileError::Apply(_) => "ApplyError",
            ReconcileError::ApplyNotFinished(_) => "ApplyNotFinishedError",
            ReconcileError::ApplyFailed(_) => "ApplyFailedError",
            ReconcileError::Remove(_) => "RemoveError",
        }
    }

    /// Whether the control loop should requeue the plugin
    ///
    /// A failed preview render belongs to that single call and is not
    /// retried; everything else is.
    pub fn should_requeue(&self) -> bool {
        !matches!(self, ReconcileError::Render(_))
    }

    /// Whether the status was partially updated before this error was returned
    pub fn is_partial_update(&self) -> bool {
        matches!(
            self,
            ReconcileError::ApplyNotFinished(_) | ReconcileError::ApplyFailed(_)
        )
    }
}

/// A single manifest document that could not be turned into a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// Zero-based position among the manifest's non-blank documents
    pub index: usize,
    pub reason: String,
}

/// Advisory error from manifest splitting
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "failed to parse {} manifest document(s){}",
    .failures.len(),
    describe_failures(.failures)
)]
pub struct ManifestParseError {
    pub failures: Vec<DocumentFailure>,
}

fn describe_failures(failures: &[DocumentFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("; document {}: {}", failure.index, failure.reason))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_classification() {
        let not_found = ReconcileError::from(SourceError::NotFound("sample".to_string()));
        assert_eq!(not_found.kind(), "SourceResolutionError");
        assert!(not_found.should_requeue());
        assert!(!not_found.is_partial_update());

        let render = ReconcileError::Render(EngineError::Timeout(Duration::from_secs(5)));
        assert!(!render.should_requeue());

        let pending = ReconcileError::ApplyNotFinished("Upgrade in progress".to_string());
        assert!(pending.should_requeue());
        assert!(pending.is_partial_update());
    }

    #[test]
    fn test_messages() {
        let pending = ReconcileError::ApplyNotFinished("Install in progress".to_string());
        insta::assert_snapshot!(pending.to_string(), @"apply not finished: Install in progress");

        let parse = ManifestParseError {
            failures: vec![
                DocumentFailure {
                    index: 1,
                    reason: "resource missing kind".to_string(),
                },
                DocumentFailure {
                    index: 3,
                    reason: "document is not a mapping".to_string(),
                },
            ],
        };
        insta::assert_snapshot!(
            parse.to_string(),
            @"failed to parse 2 manifest document(s); document 1: resource missing kind; document 3: document is not a mapping"
        );
    }
}
