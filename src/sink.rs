//! A [`JobQueue`] that keeps every request it receives.
//!
//! The CLI prints the collected requests as JSON instead of scheduling them.

use async_trait::async_trait;
use ef_core::{Error, Result};
use ef_planner::{CreateJobsRequest, JobQueue};
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct JobSink {
    requests: Mutex<Vec<CreateJobsRequest>>,
    closed: bool,
}

impl JobSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every request with [`Error::Queue`].
    pub fn closed() -> Self {
        Self {
            requests: Mutex::default(),
            closed: true,
        }
    }

    pub fn requests(&self) -> Vec<CreateJobsRequest> {
        self.requests.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }

    /// Pretty JSON of everything received so far.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.requests.lock())
    }
}

#[async_trait]
impl JobQueue for JobSink {
    async fn create_jobs(&self, request: CreateJobsRequest) -> Result<()> {
        if self.closed {
            return Err(Error::queue("job sink is closed"));
        }
        tracing::debug!(
            video_id = %request.video.id,
            stages = request.graph.stage_count(),
            jobs = request.graph.job_count(),
            "jobs received"
        );
        self.requests.lock().push(request);
        Ok(())
    }
}
