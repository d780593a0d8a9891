//! Application paths management.

use directories::ProjectDirs;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Directory name used under per-user data roots.
pub const APP_NAME: &str = "vidup";

/// Manages all application paths following platform conventions.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("com", APP_NAME, APP_NAME)?;

        let config_dir = proj_dirs.config_dir().to_path_buf();
        let data_dir = proj_dirs.data_dir().to_path_buf();

        Some(Self {
            config_file: config_dir.join("config.toml"),
            config_dir,
            data_dir,
        })
    }

    /// Create all necessary directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    /// Check if vidup has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }

    /// Directory containing the running executable.
    ///
    /// This is where bundled tools live in a packaged install.
    pub fn executable_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
    }
}

/// Per-user root for tool installs when the app directory is read-only.
///
/// Tries `%LOCALAPPDATA%`, then `%APPDATA%`, then the platform local data dir.
pub fn user_install_root() -> Option<PathBuf> {
    let project_dir = ProjectDirs::from("com", APP_NAME, APP_NAME)
        .map(|dirs| dirs.data_local_dir().to_path_buf());

    resolve_user_root(
        std::env::var_os("LOCALAPPDATA"),
        std::env::var_os("APPDATA"),
        project_dir,
    )
}

fn resolve_user_root(
    local_app_data: Option<OsString>,
    app_data: Option<OsString>,
    project_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    local_app_data
        .into_iter()
        .chain(app_data)
        .find(|value| !value.is_empty())
        .map(|base| PathBuf::from(base).join(APP_NAME))
        .or(project_dir)
}
