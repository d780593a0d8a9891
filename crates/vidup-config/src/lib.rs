//! Vidup Config - Configuration management for vidup.

mod config;
mod error;
mod paths;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use paths::{user_install_root, AppPaths, APP_NAME};
