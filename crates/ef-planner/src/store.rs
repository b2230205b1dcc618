//! Durable video state, as seen by the planner.

use std::path::PathBuf;

use async_trait::async_trait;
use ef_core::{Resolution, VideoFileId, VideoId};
use serde::{Deserialize, Serialize};

/// A video the planner schedules work for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInput {
    pub id: VideoId,
    /// Highest frame rate across the video's files; `0.0` when unknown.
    pub max_fps: f64,
    pub audio_only: bool,
}

/// One stored file of a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFile {
    pub id: VideoFileId,
    pub video_id: VideoId,
    pub resolution: Resolution,
    pub fps: f64,
    /// Location of the file, valid while the video's lock is held.
    pub path: PathBuf,
}

impl VideoFile {
    /// Whether this is an audio-only file.
    pub fn is_audio(&self) -> bool {
        self.resolution.is_no_video()
    }
}

/// Read access to durable video state.
///
/// The planner reloads both records after taking the video's lock, since
/// other writers may have changed them while it waited.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn reload_video(&self, id: VideoId) -> ef_core::Result<VideoInput>;

    async fn reload_file(&self, id: VideoFileId) -> ef_core::Result<VideoFile>;
}
