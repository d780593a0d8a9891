//! Error types for icon packing.

use thiserror::Error;

/// Result type for icon operations.
pub type IconResult<T> = Result<T, IconError>;

/// Errors that can occur while building or reading an icon.
#[derive(Error, Debug)]
pub enum IconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("No icon sizes given")]
    NoSizes,

    #[error("Icon size {0} is outside 1..=256")]
    InvalidSize(u32),

    #[error("Too many images for one icon: {0}")]
    TooManyImages(usize),

    #[error("Malformed icon: {0}")]
    Malformed(String),
}
