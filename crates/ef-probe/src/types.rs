//! Stream descriptors produced by probing.

use std::path::PathBuf;
use std::time::Duration;

use ef_core::Resolution;
use serde::{Deserialize, Serialize};

/// Stream parameters of one media file, captured once per planning call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaFileDescriptor {
    /// Path of the probed file.
    pub file_path: PathBuf,
    /// Container-level bit rate in bits per second.
    pub format_bit_rate: Option<u64>,
    /// Total duration (if determinable).
    pub duration: Option<Duration>,
    /// First video stream, if any.
    pub video: Option<VideoStreamInfo>,
    /// First audio stream, if any.
    pub audio: Option<AudioStreamInfo>,
}

/// Parameters of a video stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    /// Codec name as reported by ffprobe (`h264`, `hevc`, ...).
    pub codec_name: String,
    /// Pixel format (`yuv420p`, `yuv420p10le`, ...).
    pub pix_fmt: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Frame rate in frames per second, unrounded.
    pub frame_rate: Option<f64>,
    /// Stream-level bit rate in bits per second.
    pub bit_rate: Option<u64>,
}

/// Parameters of an audio stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    /// Codec name as reported by ffprobe (`aac`, `mp3`, `opus`, ...).
    pub codec_name: String,
    /// Bit rate in bits per second.
    pub bit_rate: Option<u64>,
    /// Channel layout (`stereo`, `5.1`, `quad`, `unknown`, ...).
    pub channel_layout: Option<String>,
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
}

/// Derived geometry of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
    /// Long side over short side; `0.0` when either side is unknown.
    pub ratio: f64,
    /// Short side of the frame.
    pub resolution: Resolution,
    pub is_portrait: bool,
}

impl MediaFileDescriptor {
    /// Whether the file carries an audio stream.
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Measured video bit rate: the container bit rate when present, the
    /// video stream's own otherwise. Zero counts as unknown.
    pub fn video_bitrate(&self) -> Option<u64> {
        self.format_bit_rate
            .filter(|b| *b > 0)
            .or_else(|| self.video.as_ref().and_then(|v| v.bit_rate).filter(|b| *b > 0))
    }

    /// Video frame rate rounded to the nearest integer; `0.0` without video.
    pub fn fps(&self) -> f64 {
        self.video
            .as_ref()
            .and_then(|v| v.frame_rate)
            .filter(|f| *f > 0.0)
            .map(f64::round)
            .unwrap_or(0.0)
    }

    /// Geometry of the video stream; all zero for audio-only files.
    pub fn dimensions(&self) -> VideoDimensions {
        let (width, height) = self
            .video
            .as_ref()
            .map(|v| (v.width, v.height))
            .unwrap_or((0, 0));

        let short = width.min(height);
        let long = width.max(height);
        let ratio = if short == 0 {
            0.0
        } else {
            f64::from(long) / f64::from(short)
        };

        VideoDimensions {
            width,
            height,
            ratio,
            resolution: Resolution::new(short),
            is_portrait: height > width,
        }
    }
}
