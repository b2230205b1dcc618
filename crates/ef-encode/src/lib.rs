//! # ef-encode
//!
//! Pure, configuration-driven encoding decisions.
//!
//! - **[`bitrate`]** -- theoretical min/average/max bitrates from
//!   resolution, frame rate and aspect ratio, and the capped target bitrate.
//! - **[`quick`]** -- whether an input's streams can be stream-copied
//!   instead of re-encoded.
//! - **[`profiles`]** -- per-codec option builders and their per-resolution
//!   tuning tables (x264, x265, AAC, FDK-AAC).
//! - **[`EncoderProfileRegistry`]** -- per-context try-lists and named
//!   builders, resolving the first usable codec for a stream.
//!
//! Nothing in this crate performs I/O.

pub mod bitrate;
pub mod profiles;
pub mod quick;
pub mod registry;

pub use bitrate::{
    average_theoretical_bitrate, max_theoretical_bitrate, min_theoretical_bitrate, target_bitrate,
};
pub use profiles::{EncoderOptions, EncoderOptionsBuilder, EncoderOptionsParams};
pub use quick::{can_quick_transcode, can_quick_transcode_audio, can_quick_transcode_video};
pub use registry::{EncoderProfileRegistry, ResolvedEncoder};
