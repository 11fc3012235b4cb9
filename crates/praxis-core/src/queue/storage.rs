//! Queue storage trait.

use super::model::QueueItem;
use anyhow::Result;
use async_trait::async_trait;

/// Durable single-slot storage for the offline queue.
///
/// The whole queue is serialized as one flat list under a single key, so a
/// persisted queue survives process restarts. Loading is infallible by
/// contract: storage that is missing, unreadable or corrupt reads as an
/// empty queue (implementations log the condition), because a broken queue
/// slot must never take the application down.
#[async_trait]
pub trait QueueStorage: Send + Sync {
    /// Loads the persisted queue, oldest first. Never fails.
    async fn load(&self) -> Vec<QueueItem>;

    /// Replaces the persisted queue with `items`.
    async fn persist(&self, items: &[QueueItem]) -> Result<()>;
}
