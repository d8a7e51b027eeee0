//! Plugin Installer Model Layer
//!
//! Structure:
//! - `plugin.rs` - Desired state (descriptor) and recorded state (status)
//! - `release.rs` - Release metadata reported by the deployment engine

pub mod plugin;
pub mod release;

pub use plugin::{PluginDescriptor, PluginPhase, PluginStatus, ResourceRef, Values};
pub use release::{Chart, ChartMetadata, Release, ReleaseInfo, ReleaseStatus};
