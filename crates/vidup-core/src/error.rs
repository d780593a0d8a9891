//! Error types for vidup.

use thiserror::Error;

/// Core error type for vidup operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown tool: {0}. Expected 'ffmpeg' or 'realesrgan'.")]
    UnknownTool(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias using vidup's Error.
pub type Result<T> = std::result::Result<T, Error>;
