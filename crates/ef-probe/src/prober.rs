//! The [`Prober`] trait defining the interface for media file probing.

use std::path::Path;

use async_trait::async_trait;

use crate::types::MediaFileDescriptor;

/// A media file prober capable of extracting stream parameters.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
/// Probing is the only suspending operation the planner performs while it
/// holds a video's lock.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe the media file at `path`.
    ///
    /// Returns a [`MediaFileDescriptor`] on success, or an error if the file
    /// cannot be read or parsed.
    async fn probe(&self, path: &Path) -> ef_core::Result<MediaFileDescriptor>;
}
