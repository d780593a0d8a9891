//! Vidup OpenRouter - Chat-completion client for checking API connectivity.
//!
//! The probe sends one fixed request and, if the API rejects it, retries once
//! with only the authorization and content-type headers.

mod client;
mod error;
mod types;

pub use client::{truncate_body, HeaderSet, OpenRouterClient};
pub use error::{OpenRouterError, OpenRouterResult};
pub use types::*;
