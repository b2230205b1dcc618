//! Transcoding policy configuration.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! on-demand and live transcoding policy plus external tool overrides. Every
//! section defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::{Error, Resolution, TranscodingContext};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transcoding: TranscodingConfig,
    pub live: LiveConfig,
    pub tools: ToolsConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Maximum output frame rate for the given context.
    pub fn max_fps(&self, context: TranscodingContext) -> f64 {
        match context {
            TranscodingContext::Vod => self.transcoding.fps.max,
            TranscodingContext::Live => self.live.transcoding.fps.max,
        }
    }

    /// Enabled resolution set for the given context.
    pub fn resolutions(&self, context: TranscodingContext) -> &ResolutionsConfig {
        match context {
            TranscodingContext::Vod => &self.transcoding.resolutions,
            TranscodingContext::Live => &self.live.transcoding.resolutions,
        }
    }

    /// Encoder try-list overrides for the given context.
    pub fn encoders(&self, context: TranscodingContext) -> &EncodersConfig {
        match context {
            TranscodingContext::Vod => &self.transcoding.encoders,
            TranscodingContext::Live => &self.live.transcoding.encoders,
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let t = &self.transcoding;

        if t.fps.max < 1.0 {
            warnings.push(format!(
                "transcoding.fps.max is {}; output frame rates will be clamped to it and planning fails below 0.1",
                t.fps.max
            ));
        }
        if self.live.transcoding.fps.max < 1.0 {
            warnings.push(format!(
                "live.transcoding.fps.max is {}; output frame rates will be clamped to it and planning fails below 0.1",
                self.live.transcoding.fps.max
            ));
        }

        if (t.hls.enabled || t.web_videos.enabled) && t.resolutions.enabled().is_empty() {
            warnings.push(
                "no transcoding resolution is enabled; only the origin rendition will be produced"
                    .into(),
            );
        }

        if !t.hls.enabled && !t.web_videos.enabled {
            warnings.push(
                "both hls and web_videos are disabled; plans will contain no jobs".into(),
            );
        }

        if t.hls.split_audio_and_video && !t.hls.enabled {
            warnings.push("hls.split_audio_and_video is set but hls is disabled".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// On-demand transcoding policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodingConfig {
    pub hls: HlsConfig,
    pub web_videos: WebVideosConfig,
    pub resolutions: ResolutionsConfig,
    pub fps: FpsConfig,
    /// Keep the upload's own resolution as the ladder origin instead of
    /// snapping it down to the largest enabled resolution.
    #[serde(default = "default_true")]
    pub always_transcode_original_resolution: bool,
    /// Emit an optimize-in-place job instead of a fresh flat rendition for
    /// the origin resolution of a video input.
    pub optimize_original: bool,
    pub audio_bitrate_policy: AudioBitratePolicy,
    pub encoders: EncodersConfig,
}

impl Default for TranscodingConfig {
    fn default() -> Self {
        Self {
            hls: HlsConfig::default(),
            web_videos: WebVideosConfig::default(),
            resolutions: ResolutionsConfig::default(),
            fps: FpsConfig::default(),
            always_transcode_original_resolution: true,
            optimize_original: false,
            audio_bitrate_policy: AudioBitratePolicy::default(),
            encoders: EncodersConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Segmented (HLS) output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsConfig {
    pub enabled: bool,
    /// Produce one shared audio-only playlist instead of muxing audio into
    /// every video rendition.
    pub split_audio_and_video: bool,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            split_audio_and_video: false,
        }
    }
}

/// Flat web-video output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebVideosConfig {
    pub enabled: bool,
}

/// Frame-rate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FpsConfig {
    pub max: f64,
}

impl Default for FpsConfig {
    fn default() -> Self {
        Self { max: 60.0 }
    }
}

/// How the AAC builder picks an output bitrate when it re-encodes audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioBitratePolicy {
    /// Always encode at 320 kbit/s.
    #[default]
    Fixed,
    /// Derive a ceiling from the measured input bitrate.
    Measured,
}

/// Per-context encoder try-list overrides.
///
/// `None` keeps the built-in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodersConfig {
    pub video: Option<Vec<String>>,
    pub audio: Option<Vec<String>>,
}

/// Which resolutions may be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionsConfig {
    #[serde(rename = "0p")]
    pub p0: bool,
    #[serde(rename = "144p")]
    pub p144: bool,
    #[serde(rename = "240p")]
    pub p240: bool,
    #[serde(rename = "360p")]
    pub p360: bool,
    #[serde(rename = "480p")]
    pub p480: bool,
    #[serde(rename = "720p")]
    pub p720: bool,
    #[serde(rename = "1080p")]
    pub p1080: bool,
    #[serde(rename = "1440p")]
    pub p1440: bool,
    #[serde(rename = "2160p")]
    pub p2160: bool,
}

impl Default for ResolutionsConfig {
    fn default() -> Self {
        Self {
            p0: false,
            p144: true,
            p240: true,
            p360: true,
            p480: true,
            p720: true,
            p1080: true,
            p1440: false,
            p2160: false,
        }
    }
}

impl ResolutionsConfig {
    /// A config with nothing enabled.
    pub fn none() -> Self {
        Self {
            p0: false,
            p144: false,
            p240: false,
            p360: false,
            p480: false,
            p720: false,
            p1080: false,
            p1440: false,
            p2160: false,
        }
    }

    /// Build a config enabling exactly the given resolutions. Non-standard
    /// values are ignored.
    pub fn only(resolutions: &[Resolution]) -> Self {
        let mut cfg = Self::none();
        for &r in resolutions {
            cfg.set(r, true);
        }
        cfg
    }

    /// Whether `resolution` is enabled. Non-standard resolutions never are.
    pub fn is_enabled(&self, resolution: Resolution) -> bool {
        match resolution.height() {
            0 => self.p0,
            144 => self.p144,
            240 => self.p240,
            360 => self.p360,
            480 => self.p480,
            720 => self.p720,
            1080 => self.p1080,
            1440 => self.p1440,
            2160 => self.p2160,
            _ => false,
        }
    }

    pub fn set(&mut self, resolution: Resolution, enabled: bool) {
        let slot = match resolution.height() {
            0 => &mut self.p0,
            144 => &mut self.p144,
            240 => &mut self.p240,
            360 => &mut self.p360,
            480 => &mut self.p480,
            720 => &mut self.p720,
            1080 => &mut self.p1080,
            1440 => &mut self.p1440,
            2160 => &mut self.p2160,
            _ => return,
        };
        *slot = enabled;
    }

    /// Enabled resolutions, ascending.
    pub fn enabled(&self) -> Vec<Resolution> {
        Resolution::STANDARD
            .into_iter()
            .filter(|r| self.is_enabled(*r))
            .collect()
    }
}

/// Live transcoding section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub transcoding: LiveTranscodingConfig,
}

/// Live transcoding policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveTranscodingConfig {
    pub resolutions: ResolutionsConfig,
    pub fps: FpsConfig,
    pub encoders: EncodersConfig,
}

impl Default for LiveTranscodingConfig {
    fn default() -> Self {
        Self {
            resolutions: ResolutionsConfig::default(),
            fps: FpsConfig { max: 30.0 },
            encoders: EncodersConfig::default(),
        }
    }
}

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffprobe_path: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
}
