//! Vidup Deps - Presence checks and provisioning for external tools.
//!
//! This crate provides:
//! - Presence checks for FFmpeg and the Real-ESRGAN ncnn engine
//! - Streaming archive downloads with progress reporting
//! - Selective extraction of archive members into the install layout
//! - A background worker that installs whatever is missing

mod download;
mod error;
mod extract;
mod layout;
mod progress;
mod provisioner;

pub use download::download_file;
pub use error::{DepsError, DepsResult};
pub use extract::extract_matching;
pub use layout::{executable_name, executable_path, extract_rules, tool_dir, ExtractRule, MemberPattern};
pub use progress::DownloadProgress;
pub use provisioner::{Provisioner, ToolStatus};
