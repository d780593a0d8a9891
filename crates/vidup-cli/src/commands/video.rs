//! Video commands - sample frames and make thumbnails.

use super::{load_config, resolve_app_dir};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use vidup_config::{user_install_root, Config};
use vidup_core::{parse_dimensions, Tool};
use vidup_deps::executable_path;
use vidup_video::{
    extract_frames, get_video_thumbnail, save_frames, FfmpegCapture, FfmpegTools, FrameSource,
};

/// First install root holding an FFmpeg executable.
fn installed_ffmpeg<I>(roots: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    roots
        .into_iter()
        .map(|root| executable_path(&root, Tool::Ffmpeg))
        .find(|path| path.is_file())
}

/// Prefer a provisioned FFmpeg over the one on `PATH`.
fn ffmpeg_tools(config: &Config) -> Result<FfmpegTools> {
    let roots = resolve_app_dir(None, config)
        .ok()
        .into_iter()
        .chain(user_install_root());
    let installed = installed_ffmpeg(roots);

    let tools = match installed {
        Some(ffmpeg) => FfmpegTools::beside(&ffmpeg)?,
        None => FfmpegTools::system()?,
    };
    tracing::debug!("Using {:?} and {:?}", tools.ffmpeg, tools.ffprobe);
    Ok(tools)
}

fn open(video: &Path, config: &Config) -> Result<FfmpegCapture> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Opening {}", video.display()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let capture = FfmpegCapture::open(video, ffmpeg_tools(config)?);
    pb.finish_and_clear();
    Ok(capture?)
}

fn file_stem(video: &Path) -> &str {
    video
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video")
}

pub fn frames(video: &Path, count: Option<usize>, output: &Path) -> Result<()> {
    let config = load_config()?;
    let count = count.unwrap_or(config.video.frame_count);

    let capture = open(video, &config)?;
    let info = capture.info();
    println!(
        "{} {} ({}x{}, {} frames)",
        "Video:".cyan().bold(),
        video.display(),
        info.width,
        info.height,
        capture.frame_count()
    );

    let frames = extract_frames(&capture, count)
        .with_context(|| format!("Failed to extract frames from {}", video.display()))?;
    let paths = save_frames(&frames, output, file_stem(video)).context("Failed to save frames")?;

    for path in &paths {
        println!("  {} {}", "✓".green(), path.display());
    }
    println!("\n{} {} frames", "Saved:".green().bold(), paths.len());

    Ok(())
}

pub fn thumbnail(video: &Path, size: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let size = match size {
        Some(s) => parse_dimensions(&s)?,
        None => (config.video.thumbnail_width, config.video.thumbnail_height),
    };

    let capture = open(video, &config)?;
    let thumb = get_video_thumbnail(&capture, size)
        .with_context(|| format!("Failed to create thumbnail for {}", video.display()))?;

    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}_thumb.png", file_stem(video))));
    thumb
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} {} ({}x{})",
        "Thumbnail:".green().bold(),
        output.display(),
        thumb.width(),
        thumb.height()
    );

    Ok(())
}
