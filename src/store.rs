//! In-process [`VideoStore`].

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use ef_core::{Error, Result, VideoFileId, VideoId};
use ef_planner::{VideoFile, VideoInput, VideoStore};
use ef_probe::MediaFileDescriptor;
use parking_lot::RwLock;

/// Videos and files held in memory.
#[derive(Debug, Default)]
pub struct InMemoryVideoStore {
    videos: RwLock<HashMap<VideoId, VideoInput>>,
    files: RwLock<HashMap<VideoFileId, VideoFile>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_video(&self, video: VideoInput) {
        self.videos.write().insert(video.id, video);
    }

    pub fn insert_file(&self, file: VideoFile) {
        self.files.write().insert(file.id, file);
    }

    /// Register a freshly uploaded file as a new video with one primary file,
    /// filling the stored fields from its probe.
    pub fn import(&self, path: &Path, probe: &MediaFileDescriptor) -> (VideoId, VideoFileId) {
        let video_id = VideoId::new();
        let file_id = VideoFileId::new();
        let fps = probe.fps();

        self.insert_video(VideoInput {
            id: video_id,
            max_fps: fps,
            audio_only: probe.video.is_none(),
        });
        self.insert_file(VideoFile {
            id: file_id,
            video_id,
            resolution: probe.dimensions().resolution,
            fps,
            path: path.to_path_buf(),
        });

        tracing::debug!(video_id = %video_id, file_id = %file_id, "imported {}", path.display());
        (video_id, file_id)
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn reload_video(&self, id: VideoId) -> Result<VideoInput> {
        self.videos
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("video", id))
    }

    async fn reload_file(&self, id: VideoFileId) -> Result<VideoFile> {
        self.files
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("video_file", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ef_core::Resolution;
    use ef_probe::{AudioStreamInfo, VideoStreamInfo};

    fn probe_720p() -> MediaFileDescriptor {
        MediaFileDescriptor {
            file_path: "clip.mp4".into(),
            video: Some(VideoStreamInfo {
                codec_name: "h264".into(),
                width: 1280,
                height: 720,
                frame_rate: Some(29.97),
                ..Default::default()
            }),
            audio: Some(AudioStreamInfo {
                codec_name: "aac".into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn import_then_reload() {
        let store = InMemoryVideoStore::new();
        let (video_id, file_id) = store.import(Path::new("clip.mp4"), &probe_720p());

        let video = store.reload_video(video_id).await.unwrap();
        assert_eq!(video.max_fps, 30.0);
        assert!(!video.audio_only);

        let file = store.reload_file(file_id).await.unwrap();
        assert_eq!(file.video_id, video_id);
        assert_eq!(file.resolution, Resolution::P720);
        assert!(!file.is_audio());
    }

    #[tokio::test]
    async fn audio_import_has_no_video_resolution() {
        let store = InMemoryVideoStore::new();
        let probe = MediaFileDescriptor {
            audio: Some(AudioStreamInfo::default()),
            ..Default::default()
        };
        let (video_id, file_id) = store.import(Path::new("song.mp3"), &probe);

        assert!(store.reload_video(video_id).await.unwrap().audio_only);
        assert!(store.reload_file(file_id).await.unwrap().is_audio());
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let store = InMemoryVideoStore::new();
        let err = store.reload_video(VideoId::new()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        let err = store.reload_file(VideoFileId::new()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
