//! Error type shared by every encodeforge crate.
//!
//! A planning call can fail in the prober, the lock registry, the video store
//! or the job queue; all of them report through [`Error`].

use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A video or file record is missing from the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Bad input or configuration.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// ffprobe or ffmpeg could not be run, or exited non-zero.
    #[error("Tool error [{tool}]: {message}")]
    Tool { tool: String, message: String },

    /// Probe output could not be understood.
    #[error("Probe error: {0}")]
    Probe(String),

    /// The video's lock was busy or the wait timed out.
    #[error("Lock error for video {video}: {message}")]
    Lock { video: String, message: String },

    #[error("Unknown transcoding type: {0}")]
    UnknownTranscodingType(String),

    /// Input frame rate below the transcodable minimum.
    #[error("Cannot compute FPS: {0}")]
    Fps(String),

    /// Every candidate codec for a stream was skipped.
    #[error("No encoder available for {stream} ({context}): {message}")]
    Encoder {
        stream: String,
        context: String,
        message: String,
    },

    /// The job queue refused the staged graph.
    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn lock(video: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::Lock {
            video: video.to_string(),
            message: message.into(),
        }
    }

    pub fn encoder(
        stream: impl fmt::Display,
        context: impl fmt::Display,
        message: impl Into<String>,
    ) -> Self {
        Self::Encoder {
            stream: stream.to_string(),
            context: context.to_string(),
            message: message.into(),
        }
    }

    pub fn queue(message: impl Into<String>) -> Self {
        Self::Queue(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
