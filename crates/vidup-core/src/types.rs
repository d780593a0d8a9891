//! Core types shared across the vidup crates.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External tool that vidup can provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Ffmpeg,
    RealEsrgan,
}

impl Tool {
    /// All tools, in provisioning order.
    pub const ALL: [Tool; 2] = [Tool::Ffmpeg, Tool::RealEsrgan];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::RealEsrgan => "realesrgan",
        }
    }

    /// Human-readable name used in status messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "FFmpeg",
            Tool::RealEsrgan => "Real-ESRGAN",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ffmpeg" => Ok(Tool::Ffmpeg),
            "realesrgan" | "real-esrgan" | "esrgan" => Ok(Tool::RealEsrgan),
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }
}

/// A human-readable status line with optional progress in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub message: String,
    pub progress: Option<f32>,
}

impl StatusUpdate {
    /// A status message without progress information.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            progress: None,
        }
    }

    /// A status message with a progress fraction, clamped to `0.0..=1.0`.
    pub fn with_progress(message: impl Into<String>, progress: f32) -> Self {
        Self {
            message: message.into(),
            progress: Some(progress.clamp(0.0, 1.0)),
        }
    }
}

/// Notification delivered to status callbacks.
///
/// `Complete` is sent exactly once, after all background work has finished.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    Status(StatusUpdate),
    Complete,
}

impl StatusEvent {
    pub fn is_complete(&self) -> bool {
        matches!(self, StatusEvent::Complete)
    }
}

impl From<StatusUpdate> for StatusEvent {
    fn from(update: StatusUpdate) -> Self {
        StatusEvent::Status(update)
    }
}

/// Parse a `WIDTHxHEIGHT` string such as `320x180`.
pub fn parse_dimensions(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| Error::InvalidInput(format!("expected WIDTHxHEIGHT, got '{}'", s)))?;

    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("invalid width '{}'", w)))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("invalid height '{}'", h)))?;

    if width == 0 || height == 0 {
        return Err(Error::InvalidInput("dimensions must be non-zero".to_string()));
    }

    Ok((width, height))
}
