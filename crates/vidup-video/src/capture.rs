//! Frame decoding through the FFmpeg CLI.

use crate::error::{VideoError, VideoResult};
use image::RgbImage;
use serde::Deserialize;
use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Random access to the decoded frames of a video.
pub trait FrameSource {
    /// Number of decodable frames.
    fn frame_count(&self) -> u64;

    /// Decode frame `index` (zero-based) in RGB channel order.
    fn read_frame(&self, index: u64) -> VideoResult<RgbImage>;
}

/// Locations of the `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl FfmpegTools {
    /// Tools resolved from `PATH`.
    pub fn system() -> VideoResult<Self> {
        let find = |tool: &str| {
            which::which(tool).map_err(|_| VideoError::ToolNotFound {
                tool: tool.to_string(),
            })
        };

        Ok(Self {
            ffmpeg: find("ffmpeg")?,
            ffprobe: find("ffprobe")?,
        })
    }

    /// Tools next to a known `ffmpeg` executable, falling back to `PATH`.
    pub fn beside(ffmpeg: &Path) -> VideoResult<Self> {
        let ffprobe = ffmpeg
            .parent()
            .map(|dir| dir.join(format!("ffprobe{}", EXE_SUFFIX)))
            .filter(|p| p.is_file());

        match ffprobe {
            Some(ffprobe) if ffmpeg.is_file() => Ok(Self {
                ffmpeg: ffmpeg.to_path_buf(),
                ffprobe,
            }),
            _ => Self::system(),
        }
    }
}

/// Metadata of the first video stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub frame_count: Option<u64>,
    pub fps: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
    nb_frames: Option<String>,
    nb_read_frames: Option<String>,
    r_frame_rate: Option<String>,
}

/// Parse `ffprobe -of json` output for the first video stream.
pub(crate) fn parse_probe(json: &str) -> VideoResult<StreamInfo> {
    let probe: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| VideoError::ParseError(format!("Failed to parse ffprobe output: {}", e)))?;

    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| VideoError::ParseError("no video stream".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(VideoError::ParseError("video stream has no dimensions".to_string())),
    };

    let frame_count = [stream.nb_frames.as_deref(), stream.nb_read_frames.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|n| n.parse::<u64>().ok());

    let fps = stream.r_frame_rate.as_deref().and_then(parse_rate);

    Ok(StreamInfo {
        width,
        height,
        frame_count,
        fps,
    })
}

fn parse_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den > 0.0 {
                Some(num / den)
            } else {
                None
            }
        }
        None => rate.parse().ok(),
    }
}

/// A video opened for frame access through the FFmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegCapture {
    path: PathBuf,
    tools: FfmpegTools,
    info: StreamInfo,
    frame_count: u64,
}

impl FfmpegCapture {
    /// Open a video, probing its first video stream.
    pub fn open(path: &Path, tools: FfmpegTools) -> VideoResult<Self> {
        if !path.is_file() {
            return Err(VideoError::CannotOpen {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let info = probe(&tools, path, false)?;
        let frame_count = match info.frame_count {
            Some(count) => count,
            None => {
                // Container has no frame count in its header; decode to count.
                debug!("Counting frames of {:?}", path);
                probe(&tools, path, true)?.frame_count.unwrap_or(0)
            }
        };

        debug!(
            "Opened {:?}: {}x{}, {} frames",
            path, info.width, info.height, frame_count
        );

        Ok(Self {
            path: path.to_path_buf(),
            tools,
            info,
            frame_count,
        })
    }

    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn probe(tools: &FfmpegTools, path: &Path, count_frames: bool) -> VideoResult<StreamInfo> {
    let entries = if count_frames {
        "stream=width,height,nb_read_frames,r_frame_rate"
    } else {
        "stream=width,height,nb_frames,r_frame_rate"
    };

    let mut command = Command::new(&tools.ffprobe);
    command.args(["-v", "error", "-select_streams", "v:0"]);
    if count_frames {
        command.arg("-count_frames");
    }
    let output = command
        .args(["-show_entries", entries, "-of", "json"])
        .arg(path)
        .output()?;

    if !output.status.success() {
        return Err(VideoError::CannotOpen {
            path: path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_probe(&String::from_utf8_lossy(&output.stdout)).map_err(|e| VideoError::CannotOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

impl FrameSource for FfmpegCapture {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn read_frame(&self, index: u64) -> VideoResult<RgbImage> {
        let filter = format!("select=eq(n\\,{})", index);
        let output = Command::new(&self.tools.ffmpeg)
            .args(["-v", "error", "-noautorotate", "-i"])
            .arg(&self.path)
            .args([
                "-vf", &filter,
                "-vframes", "1",
                "-f", "rawvideo",
                "-pix_fmt", "rgb24",
                "-",
            ])
            .output()?;

        if !output.status.success() {
            return Err(VideoError::FrameRead {
                index,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let (width, height) = (self.info.width, self.info.height);
        let expected = width as usize * height as usize * 3;
        if output.stdout.len() < expected {
            return Err(VideoError::FrameRead {
                index,
                reason: format!("decoded {} of {} bytes", output.stdout.len(), expected),
            });
        }

        let mut pixels = output.stdout;
        pixels.truncate(expected);
        RgbImage::from_raw(width, height, pixels).ok_or_else(|| VideoError::FrameRead {
            index,
            reason: "frame buffer does not match stream size".to_string(),
        })
    }
}
