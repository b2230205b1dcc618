//! FFprobe-based [`Prober`] implementation.
//!
//! Runs `ffprobe -v quiet -print_format json -show_format -show_streams`
//! and maps the first video and first audio stream into a
//! [`MediaFileDescriptor`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::command::ToolCommand;
use crate::prober::Prober;
use crate::types::{AudioStreamInfo, MediaFileDescriptor, VideoStreamInfo};

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    /// Create a new prober using the given ffprobe path.
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self { ffprobe_path }
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> ef_core::Result<MediaFileDescriptor> {
        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ]);
        cmd.arg(path.to_string_lossy().as_ref());

        let output = cmd.execute().await?;
        parse_ffprobe_json(path, &output.stdout)
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    pix_fmt: Option<String>,
    bit_rate: Option<String>,
    channel_layout: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse ffprobe's JSON output for the file at `path`.
pub fn parse_ffprobe_json(path: &Path, json: &str) -> ef_core::Result<MediaFileDescriptor> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| ef_core::Error::Probe(format!("ffprobe JSON parse error: {e}")))?;

    let duration = output
        .format
        .duration
        .as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(Duration::from_secs_f64);

    let mut info = MediaFileDescriptor {
        file_path: path.to_path_buf(),
        format_bit_rate: parse_u64(output.format.bit_rate.as_deref()),
        duration,
        video: None,
        audio: None,
    };

    for stream in output.streams {
        match stream.codec_type.as_deref() {
            Some("video") if info.video.is_none() => {
                let frame_rate = [stream.avg_frame_rate.as_deref(), stream.r_frame_rate.as_deref()]
                    .into_iter()
                    .flatten()
                    .filter_map(parse_frame_rate)
                    .find(|f| *f > 0.0);

                info.video = Some(VideoStreamInfo {
                    codec_name: stream.codec_name.unwrap_or_default(),
                    pix_fmt: stream.pix_fmt,
                    width: stream.width.unwrap_or(0),
                    height: stream.height.unwrap_or(0),
                    frame_rate,
                    bit_rate: parse_u64(stream.bit_rate.as_deref()),
                });
            }
            Some("audio") if info.audio.is_none() => {
                info.audio = Some(AudioStreamInfo {
                    codec_name: stream.codec_name.unwrap_or_default(),
                    bit_rate: parse_u64(stream.bit_rate.as_deref()),
                    channel_layout: stream.channel_layout,
                    channels: stream.channels,
                    sample_rate: parse_u64(stream.sample_rate.as_deref()).map(|r| r as u32),
                });
            }
            _ => {}
        }
    }

    tracing::debug!(
        path = %path.display(),
        has_video = info.video.is_some(),
        has_audio = info.audio.is_some(),
        "ffprobe parsed"
    );

    Ok(info)
}

fn parse_u64(value: Option<&str>) -> Option<u64> {
    value.and_then(|s| s.trim().parse::<u64>().ok())
}

/// Parse an ffprobe rational (`"30000/1001"`) or plain number.
fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    if let Some((num, den)) = rate_str.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }
    rate_str.parse().ok()
}
