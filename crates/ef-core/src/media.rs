//! Media-domain vocabulary: resolutions, transcoding contexts, output kinds,
//! and stream types.
//!
//! Enums serialize in lowercase (or kebab-case where the wire name has a
//! dash) and implement `Display` manually for consistent string
//! representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A rendition resolution, expressed as the short side of the frame in
/// pixels (`1080` for 1920x1080 and for 1080x1920 alike).
///
/// [`Resolution::NO_VIDEO`] (`0`) is the sentinel for an audio-only
/// rendition. Non-standard values are allowed: an upload's own resolution is
/// kept as-is (rounded to even) when it is the origin of a ladder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Resolution(u32);

impl Resolution {
    /// Audio-only sentinel.
    pub const NO_VIDEO: Self = Self(0);
    pub const P144: Self = Self(144);
    pub const P240: Self = Self(240);
    pub const P360: Self = Self(360);
    pub const P480: Self = Self(480);
    pub const P720: Self = Self(720);
    pub const P1080: Self = Self(1080);
    pub const P1440: Self = Self(1440);
    pub const P2160: Self = Self(2160);

    /// Every configurable resolution, ascending.
    pub const STANDARD: [Self; 9] = [
        Self::NO_VIDEO,
        Self::P144,
        Self::P240,
        Self::P360,
        Self::P480,
        Self::P720,
        Self::P1080,
        Self::P1440,
        Self::P2160,
    ];

    pub const fn new(height: u32) -> Self {
        Self(height)
    }

    pub const fn height(self) -> u32 {
        self.0
    }

    pub const fn is_no_video(self) -> bool {
        self.0 == 0
    }

    /// Round down to an even value; odd dimensions upset most encoders.
    #[must_use]
    pub const fn to_even(self) -> Self {
        Self(self.0 - self.0 % 2)
    }
}

impl From<u32> for Resolution {
    fn from(height: u32) -> Self {
        Self(height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_video() {
            write!(f, "audio")
        } else {
            write!(f, "{}p", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// TranscodingContext
// ---------------------------------------------------------------------------

/// Whether encoding targets a pre-recorded upload or a live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscodingContext {
    Vod,
    Live,
}

impl fmt::Display for TranscodingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vod => write!(f, "vod"),
            Self::Live => write!(f, "live"),
        }
    }
}

impl FromStr for TranscodingContext {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vod" => Ok(Self::Vod),
            "live" => Ok(Self::Live),
            other => Err(Error::Validation(format!(
                "unknown transcoding context '{other}' (expected vod or live)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// TranscodingType
// ---------------------------------------------------------------------------

/// Output family requested when regenerating renditions on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscodingType {
    /// Segmented (HLS) output: a playlist plus media segments per resolution.
    Hls,
    /// Flat web-playable file per resolution.
    WebVideo,
}

impl fmt::Display for TranscodingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hls => write!(f, "hls"),
            Self::WebVideo => write!(f, "web-video"),
        }
    }
}

impl FromStr for TranscodingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hls" => Ok(Self::Hls),
            "web-video" => Ok(Self::WebVideo),
            other => Err(Error::UnknownTranscodingType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// StreamType
// ---------------------------------------------------------------------------

/// Logical stream type an encoder is chosen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Video,
    Audio,
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}
