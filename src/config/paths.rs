//! Cross-platform directory path resolution
//!
//! Provides functions to resolve platform-appropriate paths for configuration
//! and chart cache directories.
//! - Linux/macOS: XDG Base Directory specification (~/.config, ~/.cache)
//! - Windows: Known Folder API (AppData\Roaming, AppData\Local)

use std::path::{Path, PathBuf};

const APP_NAME: &str = "plugin-installer";

/// Get the configuration directory path
///
/// Checks PLUGIN_INSTALLER_CONFIG_DIR environment variable first, then falls back to:
/// - Unix (Linux/macOS): XDG_CONFIG_HOME/plugin-installer or ~/.config/plugin-installer
/// - Windows: %APPDATA%\plugin-installer\config
pub fn config_dir() -> PathBuf {
    std::env::var("PLUGIN_INSTALLER_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(windows)]
            {
                use directories::ProjectDirs;
                ProjectDirs::from("", "", APP_NAME)
                    .map(|dirs| dirs.config_dir().to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            }
            #[cfg(not(windows))]
            {
                use directories::BaseDirs;
                std::env::var("XDG_CONFIG_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        BaseDirs::new()
                            .map(|dirs| dirs.home_dir().join(".config"))
                            .unwrap_or_else(|| PathBuf::from(".").join(".config"))
                    })
                    .join(APP_NAME)
            }
        })
}

/// Get the default chart cache directory
///
/// - Unix (Linux/macOS): XDG_CACHE_HOME/plugin-installer/charts or ~/.cache/plugin-installer/charts
/// - Windows: %LOCALAPPDATA%\plugin-installer\cache\charts
pub fn cache_dir() -> PathBuf {
    #[cfg(windows)]
    let base = {
        use directories::ProjectDirs;
        ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".").join(".cache").join(APP_NAME))
    };
    #[cfg(not(windows))]
    let base = {
        use directories::BaseDirs;
        std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".cache"))
                    .unwrap_or_else(|| PathBuf::from(".").join(".cache"))
            })
            .join(APP_NAME)
    };
    base.join("charts")
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
