//! Shared test harness for integration tests.
//!
//! [`TestPlanner`] wires a [`JobGraphBuilder`] to the in-memory store, the
//! collecting job sink and a prober replaying a recorded ffprobe fixture, so
//! plans can be produced without ffprobe installed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ef_core::config::Config;
use ef_core::{Resolution, VideoFileId, VideoId};
use ef_planner::{JobGraphBuilder, JobPayload, PlanFromScratch, VideoLockRegistry};
use ef_probe::Prober;
use encodeforge::{InMemoryVideoStore, JobSink, RecordedProber};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// HLS and flat outputs on, split audio off, the given ladder enabled.
pub fn both_outputs(ladder: &[Resolution]) -> Config {
    let mut config = Config::default();
    config.transcoding.hls.enabled = true;
    config.transcoding.web_videos.enabled = true;
    config.transcoding.resolutions = ef_core::config::ResolutionsConfig::only(ladder);
    config
}

pub struct TestPlanner {
    pub builder: JobGraphBuilder,
    pub store: Arc<InMemoryVideoStore>,
    pub sink: Arc<JobSink>,
    pub video_id: VideoId,
    pub file_id: VideoFileId,
}

impl TestPlanner {
    /// Import the fixture as a new video and build a planner over it.
    pub async fn new(config: Config, fixture_name: &str) -> Self {
        Self::with_sink(config, fixture_name, JobSink::new()).await
    }

    pub async fn with_sink(config: Config, fixture_name: &str, sink: JobSink) -> Self {
        let prober = Arc::new(
            RecordedProber::from_file(&fixture(fixture_name)).expect("fixture should parse"),
        );
        let upload = Path::new("/uploads").join(fixture_name);
        let descriptor = prober.probe(&upload).await.expect("recorded probe");

        let store = Arc::new(InMemoryVideoStore::new());
        let (video_id, file_id) = store.import(&upload, &descriptor);
        let sink = Arc::new(sink);

        let builder = JobGraphBuilder::new(
            Arc::new(config),
            store.clone(),
            prober,
            VideoLockRegistry::new(),
            sink.clone(),
        );

        Self {
            builder,
            store,
            sink,
            video_id,
            file_id,
        }
    }

    pub fn from_scratch(&self) -> PlanFromScratch {
        PlanFromScratch {
            video_id: self.video_id,
            file_id: self.file_id,
            is_new_video: true,
            user: None,
            already_locked: false,
        }
    }
}

/// `(kind, resolution)` of each job in a stage.
pub fn summary(stage: &[JobPayload]) -> Vec<(&'static str, Resolution)> {
    stage.iter().map(|j| (j.kind(), j.resolution())).collect()
}
