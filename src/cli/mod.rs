//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;
mod plugin;
mod status_store;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use logging::init_logging;
pub use plugin::{PluginCommand, build_reconciler, handle_plugin_command, load_descriptor};
pub use status_store::StatusFile;
