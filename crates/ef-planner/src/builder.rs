//! Payload construction hook.

use crate::payload::{JobPayload, JobTarget, SegmentedFlags};
use crate::store::VideoInput;

/// Constructs the payload for each job kind the planner requests.
///
/// The planner decides which jobs exist, at which resolution and frame rate,
/// and in which stage; a platform implements this trait to adjust what each
/// job carries.
pub trait PayloadBuilder: Send + Sync {
    fn optimize(&self, video: &VideoInput, target: JobTarget, quick_transcode: bool) -> JobPayload;

    fn merge_audio(&self, video: &VideoInput, target: JobTarget) -> JobPayload;

    fn segmented(&self, video: &VideoInput, target: JobTarget, flags: SegmentedFlags) -> JobPayload;

    fn flat(&self, video: &VideoInput, target: JobTarget) -> JobPayload;
}

/// Builds payloads straight from the planner's decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPayloadBuilder;

impl PayloadBuilder for DefaultPayloadBuilder {
    fn optimize(&self, _video: &VideoInput, target: JobTarget, quick_transcode: bool) -> JobPayload {
        JobPayload::Optimize {
            target,
            quick_transcode,
        }
    }

    fn merge_audio(&self, _video: &VideoInput, target: JobTarget) -> JobPayload {
        JobPayload::MergeAudio { target }
    }

    fn segmented(&self, _video: &VideoInput, target: JobTarget, flags: SegmentedFlags) -> JobPayload {
        JobPayload::Segmented { target, flags }
    }

    fn flat(&self, _video: &VideoInput, target: JobTarget) -> JobPayload {
        JobPayload::Flat { target }
    }
}
