//! Vidup Core - Shared types for the vidup support utilities.

mod error;
mod types;

pub use error::{Error, Result};
pub use types::*;
