//! Plugin Installer Library
//!
//! Reconciles the desired state of Helm-packaged cluster plugins against
//! their recorded status. The core is [`PluginReconciler`]; the source
//! resolver and deployment engine it drives are pluggable through the
//! [`SourceResolver`] and [`ChartEngine`] traits.

pub mod cli;
pub mod config;
pub mod engine;
pub mod kube;
pub mod models;
pub mod reconciler;
pub mod source;

// Re-export commonly used types for convenience
pub use engine::{ApplyOptions, ChartEngine, EngineError, RemoveOptions};
pub use models::{
    PluginDescriptor, PluginPhase, PluginStatus, Release, ReleaseInfo, ReleaseStatus, ResourceRef,
    Values,
};
pub use reconciler::{
    ManifestParseError, NOT_INSTALLED_MESSAGE, PluginReconciler, ReconcileError, normalize,
    split_manifest,
};
pub use source::{SourceError, SourceResolver};
