//! # ef-probe
//!
//! Media file probing for the planner.
//!
//! This crate provides:
//!
//! - **[`MediaFileDescriptor`]** -- the immutable snapshot of one file's video
//!   and audio stream parameters that quick-transcode checks and encoder
//!   option builders read.
//! - **[`Prober`]** -- the async probing boundary the job graph builder calls
//!   while it holds a video's lock.
//! - **[`FfprobeProber`]** -- a [`Prober`] that shells out to `ffprobe`.
//! - **[`ToolCommand`]** and tool discovery helpers ([`tools`]) for locating
//!   ffprobe/ffmpeg and listing the encoders the host ffmpeg exposes.

pub mod command;
pub mod ffprobe;
pub mod prober;
pub mod tools;
pub mod types;

// Re-export key types at crate root for convenience.
pub use command::{ToolCommand, ToolOutput};
pub use ffprobe::FfprobeProber;
pub use prober::Prober;
pub use types::{AudioStreamInfo, MediaFileDescriptor, VideoDimensions, VideoStreamInfo};
