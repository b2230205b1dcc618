//! Job payloads handed to the job queue.

use ef_core::Resolution;
use serde::Serialize;

/// Resolution, frame rate and provenance shared by every job kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JobTarget {
    pub resolution: Resolution,
    pub fps: f64,
    /// The job belongs to the first processing of a fresh upload.
    pub is_new_video: bool,
}

impl JobTarget {
    pub fn new(resolution: Resolution, fps: f64, is_new_video: bool) -> Self {
        Self {
            resolution,
            fps,
            is_new_video,
        }
    }
}

/// Flags of a segmented (HLS) job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SegmentedFlags {
    /// Remux the input streams instead of re-encoding them.
    pub copy_codecs: bool,
    /// Audio lives in its own playlist; the job carries video only (or,
    /// at the audio-only sentinel, audio only).
    pub separated_audio: bool,
    /// Flat renditions are not kept; remove them once this job finishes.
    pub delete_web_video_files: bool,
}

/// One encode task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum JobPayload {
    /// Re-encode (or remux) the original upload in place.
    Optimize {
        #[serde(flatten)]
        target: JobTarget,
        quick_transcode: bool,
    },
    /// Render an audio-only upload into a playable video.
    MergeAudio {
        #[serde(flatten)]
        target: JobTarget,
    },
    /// Playlist plus media segments.
    Segmented {
        #[serde(flatten)]
        target: JobTarget,
        #[serde(flatten)]
        flags: SegmentedFlags,
    },
    /// Single web-playable file.
    Flat {
        #[serde(flatten)]
        target: JobTarget,
    },
}

impl JobPayload {
    pub fn target(&self) -> &JobTarget {
        match self {
            Self::Optimize { target, .. }
            | Self::MergeAudio { target }
            | Self::Segmented { target, .. }
            | Self::Flat { target } => target,
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.target().resolution
    }

    pub fn fps(&self) -> f64 {
        self.target().fps
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Optimize { .. } => "optimize",
            Self::MergeAudio { .. } => "merge-audio",
            Self::Segmented { .. } => "segmented",
            Self::Flat { .. } => "flat",
        }
    }

    pub fn segmented_flags(&self) -> Option<&SegmentedFlags> {
        match self {
            Self::Segmented { flags, .. } => Some(flags),
            _ => None,
        }
    }
}
