//! Error types for OpenRouter operations.

use thiserror::Error;

/// Errors that can occur when talking to OpenRouter.
#[derive(Error, Debug)]
pub enum OpenRouterError {
    /// No API key was supplied.
    #[error("No API key. Pass --api-key or set OPENROUTER_API_KEY.")]
    MissingApiKey,

    /// Unable to reach the endpoint.
    #[error("Connection error: could not reach {host}")]
    Connection { host: String },

    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for OpenRouter operations.
pub type OpenRouterResult<T> = Result<T, OpenRouterError>;
