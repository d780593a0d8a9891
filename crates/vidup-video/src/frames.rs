//! Frame sampling and thumbnails.

use crate::capture::{FfmpegCapture, FfmpegTools, FrameSource};
use crate::error::{VideoError, VideoResult};
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Indices of `n` frames spread evenly over `total` frames.
///
/// The first and last frames are always included. Videos with no more than
/// `n` frames yield every frame.
pub fn frame_indices(total: u64, n: usize) -> Vec<u64> {
    let n = n as u64;
    if total <= n {
        return (0..total).collect();
    }
    if n <= 1 {
        return (0..n).collect();
    }

    (0..n)
        .map(|i| (i * total / (n - 1)).min(total - 1))
        .collect()
}

/// Decode `n` evenly spaced frames, in order.
pub fn extract_frames<S: FrameSource + ?Sized>(source: &S, n: usize) -> VideoResult<Vec<RgbImage>> {
    if n == 0 {
        return Err(VideoError::InvalidArgument(
            "number of frames must be at least 1".to_string(),
        ));
    }

    let total = source.frame_count();
    if total == 0 {
        return Err(VideoError::NoFrames);
    }

    let indices = frame_indices(total, n);
    debug!("Sampling frames {:?} of {}", indices, total);

    indices
        .into_iter()
        .map(|index| source.read_frame(index))
        .collect()
}

/// Largest size with the same aspect ratio as `(width, height)` inside `bounds`.
pub fn fit_within((width, height): (u32, u32), (max_w, max_h): (u32, u32)) -> (u32, u32) {
    let scale = f64::min(max_w as f64 / width as f64, max_h as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Decode the middle frame and resize it to fit inside `size`.
pub fn get_video_thumbnail<S: FrameSource + ?Sized>(source: &S, size: (u32, u32)) -> VideoResult<RgbImage> {
    if size.0 == 0 || size.1 == 0 {
        return Err(VideoError::InvalidArgument(format!(
            "thumbnail size {}x{} must be non-zero",
            size.0, size.1
        )));
    }

    let total = source.frame_count();
    if total == 0 {
        return Err(VideoError::NoFrames);
    }

    let frame = source.read_frame(total / 2)?;
    let (w, h) = fit_within(frame.dimensions(), size);
    Ok(imageops::resize(&frame, w, h, FilterType::Triangle))
}

/// Open `path` and sample `n` frames.
pub fn extract_frames_from_path(path: &Path, tools: FfmpegTools, n: usize) -> VideoResult<Vec<RgbImage>> {
    let capture = FfmpegCapture::open(path, tools)?;
    extract_frames(&capture, n)
}

/// Open `path` and produce its midpoint thumbnail.
pub fn thumbnail_from_path(path: &Path, tools: FfmpegTools, size: (u32, u32)) -> VideoResult<RgbImage> {
    let capture = FfmpegCapture::open(path, tools)?;
    get_video_thumbnail(&capture, size)
}

/// Write frames as `<stem>_frame_0001.png`, `<stem>_frame_0002.png`, ...
pub fn save_frames(frames: &[RgbImage], output_dir: &Path, stem: &str) -> VideoResult<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let mut paths = Vec::with_capacity(frames.len());
    for (i, frame) in frames.iter().enumerate() {
        let path = output_dir.join(format!("{}_frame_{:04}.png", stem, i + 1));
        frame.save(&path)?;
        paths.push(path);
    }

    info!("Saved {} frames to {:?}", paths.len(), output_dir);
    Ok(paths)
}
