//! Encoder option builders.
//!
//! A builder turns the parameters of one output stream into the encoder's
//! tuning flags. Builders are plain functions so the registry can store
//! them by name; they never touch the filesystem or spawn processes.
//!
//! Every option is one token holding a flag and its value (`"-crf 20"`).

pub mod aac;
pub mod x264;
pub mod x265;

use ef_core::config::AudioBitratePolicy;
use ef_core::Resolution;
use ef_probe::MediaFileDescriptor;
use serde::Serialize;

/// Inputs of an option builder.
#[derive(Debug, Clone, Copy)]
pub struct EncoderOptionsParams<'a> {
    pub resolution: Resolution,
    pub fps: f64,
    /// Measured input bitrate in bits per second.
    pub input_bitrate: Option<u64>,
    /// Long side over short side of the input frame.
    pub input_ratio: f64,
    /// Output stream index for multi-output (live) commands.
    pub stream_num: Option<usize>,
    /// Whether the caller allows the audio stream to be copied.
    pub can_copy_audio: bool,
    pub input_probe: &'a MediaFileDescriptor,
    pub audio_bitrate_policy: AudioBitratePolicy,
}

/// Options produced by a builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncoderOptions {
    /// Stream-copy instead of encoding; `output_options` is then empty.
    pub copy: bool,
    pub output_options: Vec<String>,
}

impl EncoderOptions {
    pub fn copy() -> Self {
        Self {
            copy: true,
            output_options: Vec::new(),
        }
    }

    pub fn encode(output_options: Vec<String>) -> Self {
        Self {
            copy: false,
            output_options,
        }
    }
}

/// Option builder signature.
pub type EncoderOptionsBuilder =
    fn(&EncoderOptionsParams<'_>) -> ef_core::Result<EncoderOptions>;

/// Rate-control multipliers applied to the target bitrate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateMultipliers {
    pub max_rate: f64,
    pub buf_size: f64,
}

impl RateMultipliers {
    pub const fn new(max_rate: f64, buf_size: f64) -> Self {
        Self { max_rate, buf_size }
    }

    /// `(maxrate, bufsize)` in bits per second for `target`.
    pub fn apply(self, target: u64) -> (u64, u64) {
        let t = target as f64;
        (
            (t * self.max_rate).floor() as u64,
            (t * self.buf_size).floor() as u64,
        )
    }
}

/// `-b:v` for a single-output command, `-b:v:2` for output stream 2.
pub fn stream_suffix(base: &str, stream_num: Option<usize>) -> String {
    match stream_num {
        Some(n) => format!("{base}:{n}"),
        None => base.to_string(),
    }
}

/// Keyframe interval of two seconds.
pub(crate) fn gop_size(fps: f64) -> u64 {
    (fps * 2.0).round().max(1.0) as u64
}
