//! Error types for dependency provisioning.

use std::path::PathBuf;
use thiserror::Error;
use vidup_core::Tool;

/// Result type for provisioning operations.
pub type DepsResult<T> = Result<T, DepsError>;

/// Errors that can occur while checking or installing tools.
#[derive(Error, Debug)]
pub enum DepsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download of {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Download stalled for {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Archive contains no files for {tool}")]
    NoMatchingEntries { tool: Tool },

    #[error("No writable install directory (tried {tried:?})")]
    NoWritableRoot { tried: Vec<PathBuf> },

    #[error("Async runtime error: {0}")]
    Runtime(String),
}
