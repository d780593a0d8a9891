//! Vidup Icon - Packs one image into a multi-resolution `.ico` file.
//!
//! Every resolution is stored as an embedded PNG, which Windows Vista and
//! later read directly.

mod error;
mod ico;

pub use error::{IconError, IconResult};
pub use ico::{
    encode_ico, pack_icon, parse_directory, render_images, IconEntry, IconImage, DEFAULT_SIZES,
};
