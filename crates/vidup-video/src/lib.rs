//! Vidup Video - Frame sampling and thumbnails.
//!
//! Frames are decoded through the FFmpeg CLI (`ffprobe` for stream
//! metadata, `ffmpeg` for pixels). Sampling logic works against the
//! [`FrameSource`] trait so it does not depend on how frames are decoded.

mod capture;
mod error;
mod frames;

pub use capture::{FfmpegCapture, FfmpegTools, FrameSource, StreamInfo};
pub use error::{VideoError, VideoResult};
pub use frames::{
    extract_frames, extract_frames_from_path, fit_within, frame_indices, get_video_thumbnail,
    save_frames, thumbnail_from_path,
};
