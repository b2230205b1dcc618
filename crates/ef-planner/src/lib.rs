//! # ef-planner
//!
//! Turns a video and its primary file into a staged encoding job graph.
//!
//! - **[`ladder`]** -- which resolutions to produce and at which frame rate.
//! - **[`JobPayload`]** / **[`PayloadBuilder`]** -- the four job kinds and the
//!   hook a platform uses to construct them.
//! - **[`VideoLockRegistry`]** -- per-video exclusive locks, released when
//!   the guard drops.
//! - **[`VideoStore`]** / **[`JobQueue`]** -- the durable-state and enqueue
//!   boundaries.
//! - **[`JobGraphBuilder`]** -- lock, reload, probe, plan, then hand the
//!   staged graph to the queue exactly once.

pub mod builder;
pub mod graph;
pub mod ladder;
pub mod lock;
pub mod payload;
pub mod queue;
pub mod store;

pub use builder::{DefaultPayloadBuilder, PayloadBuilder};
pub use graph::{ExplicitPlan, JobGraphBuilder, PlanFromScratch};
pub use ladder::{build_original_file_resolution, resolutions_to_produce, FpsPolicy};
pub use lock::{VideoLockGuard, VideoLockRegistry};
pub use payload::{JobPayload, JobTarget, SegmentedFlags};
pub use queue::{CreateJobsRequest, JobQueue, StagedGraph};
pub use store::{VideoFile, VideoInput, VideoStore};
