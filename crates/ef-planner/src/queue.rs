//! Staged job graphs and the enqueue boundary.

use async_trait::async_trait;
use ef_core::UserId;
use serde::Serialize;

use crate::payload::JobPayload;
use crate::store::VideoInput;

/// Ordered stages of jobs. Jobs within a stage may run concurrently; a stage
/// starts only once the stage before it has completed.
///
/// There is always at least one stage, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StagedGraph {
    stages: Vec<Vec<JobPayload>>,
}

impl StagedGraph {
    /// A graph whose first stage is `root`.
    pub fn with_root(root: Vec<JobPayload>) -> Self {
        Self { stages: vec![root] }
    }

    /// Append a stage.
    pub fn push(&mut self, stage: Vec<JobPayload>) {
        self.stages.push(stage);
    }

    /// Append a stage unless it is empty.
    pub fn push_non_empty(&mut self, stage: Vec<JobPayload>) {
        if !stage.is_empty() {
            self.stages.push(stage);
        }
    }

    pub fn root(&self) -> &[JobPayload] {
        &self.stages[0]
    }

    pub fn stages(&self) -> &[Vec<JobPayload>] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn job_count(&self) -> usize {
        self.stages.iter().map(Vec::len).sum()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobPayload> {
        self.stages.iter().flatten()
    }
}

/// Everything the queue needs to schedule one planning call's jobs.
#[derive(Debug, Clone, Serialize)]
pub struct CreateJobsRequest {
    pub video: VideoInput,
    pub graph: StagedGraph,
    /// User who triggered the work, when there is one.
    pub user: Option<UserId>,
}

/// The job queue the planner hands its graph to.
///
/// Called exactly once per planning call. Scheduling, execution and retries
/// belong to the queue.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn create_jobs(&self, request: CreateJobsRequest) -> ef_core::Result<()>;
}
