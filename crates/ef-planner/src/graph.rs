//! Job graph construction.
//!
//! A planning call runs `lock -> reload -> probe -> plan -> release ->
//! enqueue`. The lock guard lives only for the read-and-plan section, so it
//! is released on every exit, and the queue is called once afterwards.

use std::sync::Arc;

use ef_core::config::Config;
use ef_core::{
    Error, Resolution, Result, TranscodingContext, TranscodingType, UserId, VideoFileId, VideoId,
};
use ef_encode::can_quick_transcode;
use ef_probe::Prober;

use crate::builder::{DefaultPayloadBuilder, PayloadBuilder};
use crate::ladder::{
    build_original_file_resolution, resolutions_to_produce, FpsPolicy, AUDIO_MERGE_FPS,
    AUDIO_MERGE_RESOLUTION,
};
use crate::lock::VideoLockRegistry;
use crate::payload::{JobPayload, JobTarget, SegmentedFlags};
use crate::queue::{CreateJobsRequest, JobQueue, StagedGraph};
use crate::store::{VideoInput, VideoStore};

/// Plan every rendition of a video from its primary file.
#[derive(Debug, Clone)]
pub struct PlanFromScratch {
    pub video_id: VideoId,
    pub file_id: VideoFileId,
    pub is_new_video: bool,
    pub user: Option<UserId>,
    /// The caller already holds the video's lock.
    pub already_locked: bool,
}

/// Regenerate an explicit set of renditions, bypassing ladder policy.
#[derive(Debug, Clone)]
pub struct ExplicitPlan {
    pub video_id: VideoId,
    pub kind: TranscodingType,
    pub resolutions: Vec<Resolution>,
    pub is_new_video: bool,
}

/// Resolution and frame rate every other rendition derives from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Origin {
    resolution: Resolution,
    fps: f64,
}

/// Plans staged job graphs and hands them to a [`JobQueue`].
pub struct JobGraphBuilder {
    config: Arc<Config>,
    store: Arc<dyn VideoStore>,
    prober: Arc<dyn Prober>,
    locks: VideoLockRegistry,
    payloads: Arc<dyn PayloadBuilder>,
    queue: Arc<dyn JobQueue>,
}

impl JobGraphBuilder {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn VideoStore>,
        prober: Arc<dyn Prober>,
        locks: VideoLockRegistry,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            config,
            store,
            prober,
            locks,
            payloads: Arc::new(DefaultPayloadBuilder),
            queue,
        }
    }

    /// Replace the payload construction hook.
    pub fn with_payload_builder(mut self, payloads: Arc<dyn PayloadBuilder>) -> Self {
        self.payloads = payloads;
        self
    }

    pub fn locks(&self) -> &VideoLockRegistry {
        &self.locks
    }

    /// Plan the root renditions and the lower-resolution ladder of a video.
    ///
    /// The queue is called exactly once, even when every output is disabled
    /// and the graph is a single empty stage.
    ///
    /// # Errors
    ///
    /// - [`Error::Lock`] when the video's lock cannot be taken.
    /// - Store and probe errors; nothing is enqueued.
    /// - [`Error::Fps`] for an unusable input frame rate.
    /// - The queue's own error, returned after the lock is released.
    pub async fn plan_from_scratch(&self, request: PlanFromScratch) -> Result<StagedGraph> {
        let (video, graph) = {
            let _guard = if request.already_locked {
                None
            } else {
                Some(self.locks.lock(request.video_id).await?)
            };
            self.plan_locked(&request).await?
        };

        tracing::info!(
            video_id = %video.id,
            stages = graph.stage_count(),
            jobs = graph.job_count(),
            "planned transcoding jobs"
        );

        self.enqueue(video, graph, request.user).await
    }

    async fn plan_locked(&self, request: &PlanFromScratch) -> Result<(VideoInput, StagedGraph)> {
        let video = self.store.reload_video(request.video_id).await?;
        let file = self.store.reload_file(request.file_id).await?;

        let probe = self.prober.probe(&file.path).await?;

        let cfg = &self.config.transcoding;
        let fps_policy = FpsPolicy::for_context(&self.config, TranscodingContext::Vod);
        let has_audio = probe.has_audio();
        let audio_input = file.is_audio() || probe.video.is_none();
        let quick = !audio_input && can_quick_transcode(&probe, fps_policy.max);

        let origin = if audio_input {
            Origin {
                resolution: AUDIO_MERGE_RESOLUTION,
                fps: AUDIO_MERGE_FPS.min(fps_policy.max),
            }
        } else {
            let resolution = build_original_file_resolution(probe.dimensions().resolution, &self.config);
            let fps = fps_policy.output_fps(probe.fps(), resolution, true)?;
            Origin { resolution, fps }
        };

        tracing::debug!(
            video_id = %video.id,
            resolution = %origin.resolution,
            fps = origin.fps,
            quick,
            has_audio,
            audio_input,
            "probed primary file"
        );

        // Stage 0: everything that reads the primary file directly.
        let split_audio = cfg.hls.enabled && cfg.hls.split_audio_and_video && has_audio;
        let root_target = JobTarget::new(origin.resolution, origin.fps, request.is_new_video);
        let mut root = Vec::new();
        let mut audio_generated = false;

        if cfg.hls.enabled {
            root.push(self.payloads.segmented(
                &video,
                root_target,
                SegmentedFlags {
                    copy_codecs: quick,
                    separated_audio: split_audio,
                    delete_web_video_files: !cfg.web_videos.enabled && !split_audio,
                },
            ));

            if split_audio {
                root.push(self.audio_only_segmented(
                    &video,
                    request.is_new_video,
                    !cfg.web_videos.enabled,
                ));
                audio_generated = true;
            }
        }

        if cfg.web_videos.enabled {
            let job = if audio_input {
                self.payloads.merge_audio(&video, root_target)
            } else if cfg.optimize_original {
                self.payloads.optimize(&video, root_target, quick)
            } else {
                self.payloads.flat(&video, root_target)
            };
            root.push(job);
        }

        let mut graph = StagedGraph::with_root(root);

        // Lower ladder, highest first; each stage reads the root's output.
        let ladder = resolutions_to_produce(
            origin.resolution,
            has_audio,
            false,
            true,
            self.config.resolutions(TranscodingContext::Vod),
        );

        for resolution in &ladder {
            let fps = if resolution.is_no_video() {
                0.0
            } else {
                fps_policy.output_fps(origin.fps, *resolution, false)?
            };
            let target = JobTarget::new(*resolution, fps, request.is_new_video);
            let mut stage = Vec::new();

            if cfg.web_videos.enabled {
                stage.push(self.payloads.flat(&video, target));
            }
            if cfg.hls.enabled && !(resolution.is_no_video() && audio_generated) {
                stage.push(self.payloads.segmented(
                    &video,
                    target,
                    SegmentedFlags {
                        copy_codecs: false,
                        separated_audio: split_audio,
                        delete_web_video_files: false,
                    },
                ));
            }

            graph.push_non_empty(stage);
        }

        tracing::debug!(video_id = %video.id, ladder = ?ladder, "lower resolutions");

        Ok((video, graph))
    }

    /// Plan an explicit set of renditions of one output kind.
    ///
    /// The highest requested resolution is the root; the others share the
    /// following stage. With split audio, segmented output gets a leading
    /// audio-only stage that every video rendition reattaches to. No lock is
    /// taken and nothing is probed.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] when no resolution is requested.
    /// - Store errors, [`Error::Fps`], and the queue's own error.
    pub async fn plan_explicit(&self, request: ExplicitPlan) -> Result<StagedGraph> {
        if request.resolutions.is_empty() {
            return Err(Error::Validation(
                "at least one resolution must be requested".into(),
            ));
        }

        let video = self.store.reload_video(request.video_id).await?;
        let cfg = &self.config.transcoding;
        let fps_policy = FpsPolicy::for_context(&self.config, TranscodingContext::Vod);
        let split_audio =
            request.kind == TranscodingType::Hls && cfg.hls.split_audio_and_video;

        let mut requested = request.resolutions.clone();
        requested.sort_unstable_by(|a, b| b.cmp(a));
        requested.dedup();
        if split_audio {
            requested.retain(|r| !r.is_no_video());
        }

        tracing::info!(
            video_id = %video.id,
            kind = %request.kind,
            resolutions = ?requested,
            split_audio,
            "planning explicit transcoding jobs"
        );

        let mut stages = Vec::new();
        if split_audio {
            stages.push(vec![self.audio_only_segmented(&video, request.is_new_video, false)]);
        }

        if let Some((root, children)) = requested.split_first() {
            let job = |resolution: Resolution, is_root: bool| {
                let fps = if resolution.is_no_video() {
                    0.0
                } else {
                    fps_policy.output_fps(video.max_fps, resolution, is_root)?
                };
                let target = JobTarget::new(resolution, fps, request.is_new_video);
                Ok::<_, Error>(self.explicit_job(&video, request.kind, target, split_audio))
            };

            stages.push(vec![job(*root, true)?]);

            let children = children
                .iter()
                .map(|r| job(*r, false))
                .collect::<Result<Vec<_>>>()?;
            if !children.is_empty() {
                stages.push(children);
            }
        }

        let mut stages = stages.into_iter();
        let mut graph = StagedGraph::with_root(stages.next().unwrap_or_default());
        for stage in stages {
            graph.push(stage);
        }

        self.enqueue(video, graph, None).await
    }

    fn explicit_job(
        &self,
        video: &VideoInput,
        kind: TranscodingType,
        target: JobTarget,
        split_audio: bool,
    ) -> JobPayload {
        match kind {
            TranscodingType::Hls => self.payloads.segmented(
                video,
                target,
                SegmentedFlags {
                    copy_codecs: false,
                    separated_audio: split_audio,
                    delete_web_video_files: false,
                },
            ),
            TranscodingType::WebVideo => self.payloads.flat(video, target),
        }
    }

    fn audio_only_segmented(
        &self,
        video: &VideoInput,
        is_new_video: bool,
        delete_web_video_files: bool,
    ) -> JobPayload {
        self.payloads.segmented(
            video,
            JobTarget::new(Resolution::NO_VIDEO, 0.0, is_new_video),
            SegmentedFlags {
                copy_codecs: false,
                separated_audio: true,
                delete_web_video_files,
            },
        )
    }

    async fn enqueue(
        &self,
        video: VideoInput,
        graph: StagedGraph,
        user: Option<UserId>,
    ) -> Result<StagedGraph> {
        let video_id = video.id;
        let request = CreateJobsRequest {
            video,
            graph: graph.clone(),
            user,
        };

        if let Err(e) = self.queue.create_jobs(request).await {
            tracing::error!(video_id = %video_id, error = %e, "failed to enqueue transcoding jobs");
            return Err(e);
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::VideoFile;
    use async_trait::async_trait;
    use ef_core::config::ResolutionsConfig;
    use ef_probe::{AudioStreamInfo, MediaFileDescriptor, VideoStreamInfo};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // -- Fakes ----------------------------------------------------------------

    struct FakeStore {
        video: VideoInput,
        file: VideoFile,
    }

    #[async_trait]
    impl VideoStore for FakeStore {
        async fn reload_video(&self, id: VideoId) -> Result<VideoInput> {
            if id == self.video.id {
                Ok(self.video.clone())
            } else {
                Err(Error::not_found("video", id))
            }
        }

        async fn reload_file(&self, id: VideoFileId) -> Result<VideoFile> {
            if id == self.file.id {
                Ok(self.file.clone())
            } else {
                Err(Error::not_found("video_file", id))
            }
        }
    }

    /// Returns a canned descriptor and records whether the lock was held.
    struct FakeProber {
        result: Option<MediaFileDescriptor>,
        locks: VideoLockRegistry,
        video_id: VideoId,
        locked_during_probe: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Prober for FakeProber {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn probe(&self, path: &Path) -> Result<MediaFileDescriptor> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.locks.is_locked(self.video_id) {
                self.locked_during_probe.fetch_add(1, Ordering::SeqCst);
            }
            self.result
                .clone()
                .map(|mut d| {
                    d.file_path = path.to_path_buf();
                    d
                })
                .ok_or_else(|| Error::Probe("moov atom not found".into()))
        }
    }

    struct RecordingQueue {
        calls: AtomicUsize,
        requests: Mutex<Vec<CreateJobsRequest>>,
        fail: bool,
        locks: VideoLockRegistry,
        locked_during_enqueue: AtomicUsize,
    }

    #[async_trait]
    impl JobQueue for RecordingQueue {
        async fn create_jobs(&self, request: CreateJobsRequest) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.locks.is_locked(request.video.id) {
                self.locked_during_enqueue.fetch_add(1, Ordering::SeqCst);
            }
            self.requests.lock().unwrap().push(request);
            if self.fail {
                Err(Error::queue("broker unreachable"))
            } else {
                Ok(())
            }
        }
    }

    // -- Helpers --------------------------------------------------------------

    fn h264_1080p60() -> MediaFileDescriptor {
        MediaFileDescriptor {
            file_path: PathBuf::new(),
            format_bit_rate: Some(6_000_000),
            duration: None,
            video: Some(VideoStreamInfo {
                codec_name: "h264".into(),
                pix_fmt: Some("yuv420p".into()),
                width: 1920,
                height: 1080,
                frame_rate: Some(60.0),
                bit_rate: None,
            }),
            audio: Some(AudioStreamInfo {
                codec_name: "aac".into(),
                bit_rate: Some(128_000),
                channel_layout: Some("stereo".into()),
                channels: Some(2),
                sample_rate: Some(48_000),
            }),
        }
    }

    fn mp3_only() -> MediaFileDescriptor {
        MediaFileDescriptor {
            format_bit_rate: Some(192_000),
            audio: Some(AudioStreamInfo {
                codec_name: "mp3".into(),
                bit_rate: Some(192_000),
                channel_layout: Some("stereo".into()),
                channels: Some(2),
                sample_rate: Some(44_100),
            }),
            ..Default::default()
        }
    }

    struct Harness {
        builder: JobGraphBuilder,
        prober: Arc<FakeProber>,
        queue: Arc<RecordingQueue>,
        video_id: VideoId,
        file_id: VideoFileId,
    }

    impl Harness {
        fn new(config: Config, probe: Option<MediaFileDescriptor>, fail_queue: bool) -> Self {
            Self::with_locks(config, probe, fail_queue, VideoLockRegistry::new())
        }

        fn with_locks(
            config: Config,
            probe: Option<MediaFileDescriptor>,
            fail_queue: bool,
            locks: VideoLockRegistry,
        ) -> Self {
            Self::build(config, probe, fail_queue, locks, None)
        }

        /// `stored_max_fps` overrides the frame rate the store reports for
        /// the video, which otherwise matches the probe.
        fn build(
            config: Config,
            probe: Option<MediaFileDescriptor>,
            fail_queue: bool,
            locks: VideoLockRegistry,
            stored_max_fps: Option<f64>,
        ) -> Self {
            let video_id = VideoId::new();
            let file_id = VideoFileId::new();
            let (resolution, probed_fps) = match probe.as_ref() {
                Some(p) if p.video.is_some() => (p.dimensions().resolution, p.fps()),
                _ => (Resolution::NO_VIDEO, 0.0),
            };
            let max_fps = stored_max_fps.unwrap_or(probed_fps);

            let store = Arc::new(FakeStore {
                video: VideoInput {
                    id: video_id,
                    max_fps,
                    audio_only: resolution.is_no_video(),
                },
                file: VideoFile {
                    id: file_id,
                    video_id,
                    resolution,
                    fps: probed_fps,
                    path: PathBuf::from("/videos/input.mp4"),
                },
            });
            let prober = Arc::new(FakeProber {
                result: probe,
                locks: locks.clone(),
                video_id,
                locked_during_probe: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            });
            let queue = Arc::new(RecordingQueue {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                fail: fail_queue,
                locks: locks.clone(),
                locked_during_enqueue: AtomicUsize::new(0),
            });

            let builder = JobGraphBuilder::new(
                Arc::new(config),
                store,
                prober.clone(),
                locks,
                queue.clone(),
            );

            Self {
                builder,
                prober,
                queue,
                video_id,
                file_id,
            }
        }

        fn from_scratch(&self) -> PlanFromScratch {
            PlanFromScratch {
                video_id: self.video_id,
                file_id: self.file_id,
                is_new_video: true,
                user: Some(UserId::new()),
                already_locked: false,
            }
        }

        fn only_request(&self) -> CreateJobsRequest {
            let requests = self.queue.requests.lock().unwrap();
            assert_eq!(requests.len(), 1);
            requests[0].clone()
        }
    }

    fn both_outputs(resolutions: &[Resolution]) -> Config {
        let mut config = Config::default();
        config.transcoding.hls.enabled = true;
        config.transcoding.web_videos.enabled = true;
        config.transcoding.resolutions = ResolutionsConfig::only(resolutions);
        config
    }

    fn summary(stage: &[JobPayload]) -> Vec<(&'static str, Resolution)> {
        stage.iter().map(|j| (j.kind(), j.resolution())).collect()
    }

    // -- plan_from_scratch ----------------------------------------------------

    #[tokio::test]
    async fn ladder_scenario_1080p60() {
        let config = both_outputs(&[Resolution::P720, Resolution::P480, Resolution::P360]);
        let h = Harness::new(config, Some(h264_1080p60()), false);

        let graph = h.builder.plan_from_scratch(h.from_scratch()).await.unwrap();
        let stages = graph.stages();
        assert_eq!(stages.len(), 4);

        assert_eq!(
            stages[0],
            vec![
                JobPayload::Segmented {
                    target: JobTarget::new(Resolution::P1080, 60.0, true),
                    flags: SegmentedFlags {
                        copy_codecs: true,
                        separated_audio: false,
                        delete_web_video_files: false,
                    },
                },
                JobPayload::Flat {
                    target: JobTarget::new(Resolution::P1080, 60.0, true),
                },
            ]
        );

        assert_eq!(
            summary(&stages[1]),
            vec![("flat", Resolution::P720), ("segmented", Resolution::P720)]
        );
        assert_eq!(
            summary(&stages[2]),
            vec![("flat", Resolution::P480), ("segmented", Resolution::P480)]
        );
        assert_eq!(
            summary(&stages[3]),
            vec![("flat", Resolution::P360), ("segmented", Resolution::P360)]
        );

        // 720p keeps the input rate; smaller renditions get a standard rate.
        assert_eq!(stages[1][0].fps(), 60.0);
        assert_eq!(stages[2][0].fps(), 30.0);
        assert!(stages[1..]
            .iter()
            .flatten()
            .filter_map(JobPayload::segmented_flags)
            .all(|f| !f.copy_codecs));

        let request = h.only_request();
        assert_eq!(request.graph, graph);
        assert!(request.user.is_some());
    }

    #[tokio::test]
    async fn ladder_never_exceeds_root_fps() {
        // Another file of the video is faster than the primary one.
        let mut probe = h264_1080p60();
        if let Some(video) = probe.video.as_mut() {
            video.frame_rate = Some(30.0);
        }
        let config = both_outputs(&[Resolution::P720]);
        let h = Harness::build(config, Some(probe), false, VideoLockRegistry::new(), Some(60.0));

        let graph = h.builder.plan_from_scratch(h.from_scratch()).await.unwrap();
        let root_fps = graph.root()[0].fps();
        assert_eq!(root_fps, 30.0);
        assert_eq!(graph.stage_count(), 2);
        for job in &graph.stages()[1] {
            assert_eq!(job.resolution(), Resolution::P720);
            assert_eq!(job.fps(), root_fps);
        }
    }

    #[tokio::test]
    async fn enqueues_once_with_all_outputs_disabled() {
        let mut config = Config::default();
        config.transcoding.hls.enabled = false;
        config.transcoding.web_videos.enabled = false;
        let h = Harness::new(config, Some(h264_1080p60()), false);

        let graph = h.builder.plan_from_scratch(h.from_scratch()).await.unwrap();
        assert_eq!(graph.stage_count(), 1);
        assert!(graph.root().is_empty());
        assert_eq!(h.queue.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn lock_held_while_probing_and_released_before_enqueue() {
        let h = Harness::new(Config::default(), Some(h264_1080p60()), false);
        h.builder.plan_from_scratch(h.from_scratch()).await.unwrap();

        assert_eq!(h.prober.locked_during_probe.load(Ordering::SeqCst), 1);
        assert_eq!(h.queue.locked_during_enqueue.load(Ordering::SeqCst), 0);
        assert!(h.builder.locks().is_empty());
    }

    #[tokio::test]
    async fn already_locked_skips_locking() {
        let h = Harness::new(Config::default(), Some(h264_1080p60()), false);
        let mut request = h.from_scratch();
        request.already_locked = true;

        h.builder.plan_from_scratch(request).await.unwrap();
        assert_eq!(h.prober.locked_during_probe.load(Ordering::SeqCst), 0);
        assert_eq!(h.queue.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn probe_failure_releases_lock_and_enqueues_nothing() {
        let h = Harness::new(Config::default(), None, false);

        let err = h.builder.plan_from_scratch(h.from_scratch()).await.unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
        assert_eq!(h.queue.calls.load(Ordering::SeqCst), 0);
        assert!(!h.builder.locks().is_locked(h.video_id));
    }

    #[tokio::test]
    async fn lock_failure_happens_before_probe() {
        let locks = VideoLockRegistry::with_timeout(std::time::Duration::from_millis(10));
        let h = Harness::with_locks(Config::default(), Some(h264_1080p60()), false, locks.clone());
        let _held = locks.lock(h.video_id).await.unwrap();

        let err = h.builder.plan_from_scratch(h.from_scratch()).await.unwrap_err();
        assert!(matches!(err, Error::Lock { .. }));
        assert_eq!(h.prober.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.queue.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn enqueue_failure_is_surfaced_after_release() {
        let h = Harness::new(Config::default(), Some(h264_1080p60()), true);

        let err = h.builder.plan_from_scratch(h.from_scratch()).await.unwrap_err();
        assert!(matches!(err, Error::Queue(_)));
        assert_eq!(h.queue.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.queue.locked_during_enqueue.load(Ordering::SeqCst), 0);
        assert!(!h.builder.locks().is_locked(h.video_id));
    }

    #[tokio::test]
    async fn unknown_file_is_not_found() {
        let h = Harness::new(Config::default(), Some(h264_1080p60()), false);
        let mut request = h.from_scratch();
        request.file_id = VideoFileId::new();

        let err = h.builder.plan_from_scratch(request).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(h.prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn split_audio_generates_shared_audio_once() {
        let mut config = Config::default();
        config.transcoding.hls.split_audio_and_video = true;
        config.transcoding.resolutions =
            ResolutionsConfig::only(&[Resolution::NO_VIDEO, Resolution::P720]);
        let h = Harness::new(config, Some(h264_1080p60()), false);

        let graph = h.builder.plan_from_scratch(h.from_scratch()).await.unwrap();
        assert_eq!(
            summary(graph.root()),
            vec![("segmented", Resolution::P1080), ("segmented", Resolution::NO_VIDEO)]
        );
        let origin_flags = graph.root()[0].segmented_flags().unwrap();
        assert!(origin_flags.separated_audio);
        // Flat output is disabled but audio is split: keep flat files.
        assert!(!origin_flags.delete_web_video_files);
        assert!(graph.root()[1].segmented_flags().unwrap().delete_web_video_files);

        // The sentinel is not produced a second time in the ladder.
        assert_eq!(graph.stage_count(), 2);
        assert_eq!(summary(&graph.stages()[1]), vec![("segmented", Resolution::P720)]);
    }

    #[tokio::test]
    async fn hls_only_deletes_web_videos() {
        let mut config = Config::default();
        config.transcoding.resolutions = ResolutionsConfig::only(&[Resolution::P480]);
        let h = Harness::new(config, Some(h264_1080p60()), false);

        let graph = h.builder.plan_from_scratch(h.from_scratch()).await.unwrap();
        let flags = graph.root()[0].segmented_flags().unwrap();
        assert!(flags.delete_web_video_files);
        assert_eq!(graph.stage_count(), 2);
    }

    #[tokio::test]
    async fn audio_only_upload_is_merged() {
        let mut config = both_outputs(&[Resolution::P360, Resolution::P720]);
        config.transcoding.fps.max = 60.0;
        let h = Harness::new(config, Some(mp3_only()), false);

        let graph = h.builder.plan_from_scratch(h.from_scratch()).await.unwrap();
        assert_eq!(
            summary(graph.root()),
            vec![("segmented", Resolution::P480), ("merge-audio", Resolution::P480)]
        );
        assert_eq!(graph.root()[1].fps(), 25.0);
        assert!(!graph.root()[0].segmented_flags().unwrap().copy_codecs);

        // Only 360p lies below the merge resolution.
        assert_eq!(graph.stage_count(), 2);
        assert_eq!(graph.stages()[1][0].resolution(), Resolution::P360);
        assert_eq!(graph.stages()[1][0].fps(), 25.0);
    }

    #[tokio::test]
    async fn optimize_original_replaces_flat_root() {
        let mut config = both_outputs(&[]);
        config.transcoding.optimize_original = true;
        let h = Harness::new(config, Some(h264_1080p60()), false);

        let graph = h.builder.plan_from_scratch(h.from_scratch()).await.unwrap();
        assert!(matches!(
            graph.root()[1],
            JobPayload::Optimize { quick_transcode: true, .. }
        ));
    }

    #[tokio::test]
    async fn custom_payload_builder_is_used() {
        struct FlatOnly;
        impl PayloadBuilder for FlatOnly {
            fn optimize(&self, v: &VideoInput, t: JobTarget, _: bool) -> JobPayload {
                self.flat(v, t)
            }
            fn merge_audio(&self, v: &VideoInput, t: JobTarget) -> JobPayload {
                self.flat(v, t)
            }
            fn segmented(&self, v: &VideoInput, t: JobTarget, _: SegmentedFlags) -> JobPayload {
                self.flat(v, t)
            }
            fn flat(&self, _: &VideoInput, target: JobTarget) -> JobPayload {
                JobPayload::Flat { target }
            }
        }

        let h = Harness::new(Config::default(), Some(h264_1080p60()), false);
        let builder = h.builder.with_payload_builder(Arc::new(FlatOnly));
        let graph = builder
            .plan_from_scratch(PlanFromScratch {
                video_id: h.video_id,
                file_id: h.file_id,
                is_new_video: false,
                user: None,
                already_locked: false,
            })
            .await
            .unwrap();
        assert!(graph.jobs().all(|j| j.kind() == "flat"));
    }

    // -- plan_explicit --------------------------------------------------------

    fn explicit(h: &Harness, kind: TranscodingType, resolutions: &[Resolution]) -> ExplicitPlan {
        ExplicitPlan {
            video_id: h.video_id,
            kind,
            resolutions: resolutions.to_vec(),
            is_new_video: false,
        }
    }

    #[tokio::test]
    async fn explicit_hls_with_split_audio() {
        let mut config = Config::default();
        config.transcoding.hls.split_audio_and_video = true;
        let h = Harness::new(config, Some(h264_1080p60()), false);

        let request = explicit(
            &h,
            TranscodingType::Hls,
            &[Resolution::P480, Resolution::P1080, Resolution::P240, Resolution::NO_VIDEO],
        );
        let graph = h.builder.plan_explicit(request).await.unwrap();

        assert_eq!(summary(&graph.stages()[0]), vec![("segmented", Resolution::NO_VIDEO)]);
        assert_eq!(summary(&graph.stages()[1]), vec![("segmented", Resolution::P1080)]);
        assert_eq!(
            summary(&graph.stages()[2]),
            vec![("segmented", Resolution::P480), ("segmented", Resolution::P240)]
        );
        assert_eq!(graph.stage_count(), 3);
        assert!(graph.stages()[1][0].segmented_flags().unwrap().separated_audio);

        let request = h.only_request();
        assert!(request.user.is_none());
        // No lock and no probe on this path.
        assert_eq!(h.prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn explicit_web_video_single_resolution() {
        let h = Harness::new(Config::default(), Some(h264_1080p60()), false);
        let graph = h
            .builder
            .plan_explicit(explicit(&h, TranscodingType::WebVideo, &[Resolution::P720]))
            .await
            .unwrap();

        assert_eq!(graph.stage_count(), 1);
        assert_eq!(summary(graph.root()), vec![("flat", Resolution::P720)]);
        assert_eq!(graph.root()[0].fps(), 60.0);
    }

    #[tokio::test]
    async fn explicit_requires_resolutions() {
        let h = Harness::new(Config::default(), Some(h264_1080p60()), false);
        let err = h
            .builder
            .plan_explicit(explicit(&h, TranscodingType::Hls, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(h.queue.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_kind_is_rejected_at_parse() {
        let err = "dash".parse::<TranscodingType>().unwrap_err();
        assert!(matches!(err, Error::UnknownTranscodingType(_)));
    }
}
