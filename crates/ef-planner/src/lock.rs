//! Per-video exclusive locks.
//!
//! Holding a [`VideoLockGuard`] grants exclusive access to one video's files.
//! The lock is released when the guard drops, on every exit path.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use ef_core::{Error, Result, VideoId};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<VideoId, Arc<Mutex<()>>>;

/// Hands out one mutex per video. Entries are dropped again once nobody
/// holds or waits for them.
#[derive(Clone, Default)]
pub struct VideoLockRegistry {
    locks: Arc<LockMap>,
    timeout: Option<Duration>,
}

impl fmt::Debug for VideoLockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoLockRegistry")
            .field("videos", &self.locks.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl VideoLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up waiting for a busy lock after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            locks: Arc::default(),
            timeout: Some(timeout),
        }
    }

    fn mutex_for(&self, video_id: VideoId) -> Arc<Mutex<()>> {
        self.locks.entry(video_id).or_default().value().clone()
    }

    /// Wait for the video's lock.
    ///
    /// # Errors
    ///
    /// [`Error::Lock`] when a timeout is configured and elapses first.
    pub async fn lock(&self, video_id: VideoId) -> Result<VideoLockGuard> {
        let mutex = self.mutex_for(video_id);

        let guard = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, mutex.lock_owned()).await {
                Ok(guard) => guard,
                Err(_elapsed) => {
                    self.release_entry(video_id);
                    return Err(Error::lock(
                        video_id,
                        format!("timed out after {timeout:?}"),
                    ));
                }
            },
            None => mutex.lock_owned().await,
        };

        tracing::trace!(video_id = %video_id, "video lock acquired");
        Ok(VideoLockGuard {
            video_id,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        })
    }

    /// Take the video's lock only if it is free.
    ///
    /// # Errors
    ///
    /// [`Error::Lock`] when another holder has it.
    pub fn try_lock(&self, video_id: VideoId) -> Result<VideoLockGuard> {
        let mutex = self.mutex_for(video_id);
        match mutex.try_lock_owned() {
            Ok(guard) => Ok(VideoLockGuard {
                video_id,
                guard: Some(guard),
                locks: Arc::clone(&self.locks),
            }),
            Err(_) => {
                self.release_entry(video_id);
                Err(Error::lock(video_id, "already locked"))
            }
        }
    }

    /// Whether someone currently holds the video's lock.
    pub fn is_locked(&self, video_id: VideoId) -> bool {
        match self.locks.get(&video_id) {
            Some(ref mutex) => mutex.try_lock().is_err(),
            None => false,
        }
    }

    /// Number of videos with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn release_entry(&self, video_id: VideoId) {
        remove_if_unused(&self.locks, video_id);
    }
}

/// The map holds one reference; anything above that is a holder or waiter.
fn remove_if_unused(locks: &LockMap, video_id: VideoId) {
    locks.remove_if(&video_id, |_, mutex| Arc::strong_count(mutex) == 1);
}

/// Exclusive access to one video; released on drop.
pub struct VideoLockGuard {
    video_id: VideoId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
}

impl VideoLockGuard {
    pub fn video_id(&self) -> VideoId {
        self.video_id
    }
}

impl fmt::Debug for VideoLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoLockGuard")
            .field("video_id", &self.video_id)
            .finish()
    }
}

impl Drop for VideoLockGuard {
    fn drop(&mut self) {
        // Unlock first so the guard's reference no longer counts.
        drop(self.guard.take());
        remove_if_unused(&self.locks, self.video_id);
        tracing::trace!(video_id = %self.video_id, "video lock released");
    }
}
