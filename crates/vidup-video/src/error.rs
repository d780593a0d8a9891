//! Error types for frame extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for video operations.
pub type VideoResult<T> = Result<T, VideoError>;

/// Errors that can occur while reading video frames.
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tool not found: {tool}. Install it or run 'vidup deps install'.")]
    ToolNotFound { tool: String },

    #[error("Cannot open video {path}: {reason}")]
    CannotOpen { path: PathBuf, reason: String },

    #[error("Cannot read frame {index}: {reason}")]
    FrameRead { index: u64, reason: String },

    #[error("Video has no decodable frames")]
    NoFrames,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Parse error: {0}")]
    ParseError(String),
}
