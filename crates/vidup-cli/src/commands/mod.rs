//! CLI command implementations.

pub mod config;
pub mod deps;
pub mod icon;
pub mod init;
pub mod probe;
pub mod video;

use anyhow::{Context, Result};
use std::path::PathBuf;
use vidup_config::{AppPaths, Config};

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load configuration, falling back to defaults when no file exists.
pub fn load_config() -> Result<Config> {
    let paths = get_paths()?;
    Config::load_from(&paths.config_file).context("Failed to load configuration")
}

/// Directory tools are installed under: flag, then config, then the executable's directory.
pub fn resolve_app_dir(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    flag.or_else(|| config.app_dir())
        .or_else(AppPaths::executable_dir)
        .context("Could not determine the application directory; pass --app-dir")
}

/// Format a file size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
