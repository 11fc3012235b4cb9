//! Durable offline operation queue.
//!
//! A bounded FIFO of deferred operations, persisted through an injected
//! [`QueueStorage`] slot so it survives process restarts. The queue is an
//! explicit object constructed once at startup — storage, connectivity and
//! clock are all injected, never ambient.
//!
//! Drains operate on a snapshot: items enqueued while a pass is running are
//! picked up by the next pass, and the pass itself never holds the write
//! lock across a dispatch await.

use async_trait::async_trait;
use praxis_core::clock::Clock;
use praxis_core::connectivity::ConnectivityMonitor;
use praxis_core::error::Result;
use praxis_core::queue::{QueueItem, QueueOperation, QueueStatus, QueueStorage};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Maximum queued items; the oldest is evicted beyond this.
pub const MAX_QUEUE_LEN: usize = 100;
/// Replay attempts before an item is given up on.
pub const MAX_ITEM_RETRIES: u32 = 5;
/// Items older than this are dropped regardless of retries.
pub const MAX_ITEM_AGE_HOURS: i64 = 24;

/// Replays one queued item against the matching entry point.
#[async_trait]
pub trait QueueDispatcher: Send + Sync {
    async fn dispatch(&self, item: &QueueItem) -> Result<()>;
}

/// The persisted, bounded FIFO of deferred operations.
pub struct OfflineQueue {
    storage: Arc<dyn QueueStorage>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    clock: Arc<dyn Clock>,
    items: RwLock<Vec<QueueItem>>,
}

impl OfflineQueue {
    /// Creates the queue, restoring any items persisted by a previous run.
    pub async fn load(
        storage: Arc<dyn QueueStorage>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let items = storage.load().await;
        if !items.is_empty() {
            tracing::info!("Restored {} queued operations", items.len());
        }
        Self {
            storage,
            connectivity,
            clock,
            items: RwLock::new(items),
        }
    }

    /// Appends an operation and persists the queue; returns the item id.
    ///
    /// At capacity the oldest item is evicted to make room.
    pub async fn enqueue(
        &self,
        operation: QueueOperation,
        payload: serde_json::Value,
    ) -> Result<String> {
        let item = QueueItem {
            id: Uuid::new_v4().to_string(),
            operation,
            payload,
            enqueued_at: self.clock.now(),
            retry_count: 0,
            last_error: None,
        };
        let id = item.id.clone();

        let snapshot = {
            let mut items = self.items.write().await;
            if items.len() >= MAX_QUEUE_LEN {
                let evicted = items.remove(0);
                tracing::warn!(
                    "Offline queue full, evicting oldest item {} ({})",
                    evicted.id,
                    evicted.operation
                );
            }
            items.push(item);
            items.clone()
        };

        self.storage.persist(&snapshot).await?;
        tracing::debug!("Queued {} as {}", operation, id);
        Ok(id)
    }

    /// Replays queued items in FIFO order while the device is online.
    ///
    /// Successes are removed; failures bump `retry_count` and record the
    /// error, and an item past [`MAX_ITEM_RETRIES`] or [`MAX_ITEM_AGE_HOURS`]
    /// is dropped with a log — there is no UI context left to surface it to.
    /// Returns the number of successfully replayed items.
    pub async fn drain_if_online(&self, dispatcher: &dyn QueueDispatcher) -> usize {
        if !self.connectivity.is_online() {
            return 0;
        }
        let snapshot = { self.items.read().await.clone() };
        if snapshot.is_empty() {
            return 0;
        }
        tracing::info!("Draining {} queued operations", snapshot.len());

        let mut succeeded: HashSet<String> = HashSet::new();
        let mut failures: HashMap<String, String> = HashMap::new();
        for item in &snapshot {
            match dispatcher.dispatch(item).await {
                Ok(()) => {
                    tracing::debug!("Replayed {} ({})", item.id, item.operation);
                    succeeded.insert(item.id.clone());
                }
                Err(err) => {
                    tracing::warn!("Replay of {} ({}) failed: {}", item.id, item.operation, err);
                    failures.insert(item.id.clone(), err.to_string());
                }
            }
        }

        let now = self.clock.now();
        let max_age = chrono::Duration::hours(MAX_ITEM_AGE_HOURS);
        let survivors = {
            let mut items = self.items.write().await;
            items.retain_mut(|item| {
                if succeeded.contains(&item.id) {
                    return false;
                }
                if let Some(error) = failures.get(&item.id) {
                    item.retry_count += 1;
                    item.last_error = Some(error.clone());
                    if item.retry_count >= MAX_ITEM_RETRIES {
                        tracing::warn!(
                            "Dropping queued item {} after {} failed replays",
                            item.id,
                            item.retry_count
                        );
                        return false;
                    }
                }
                if now - item.enqueued_at > max_age {
                    tracing::warn!(
                        "Dropping queued item {} older than {}h",
                        item.id,
                        MAX_ITEM_AGE_HOURS
                    );
                    return false;
                }
                true
            });
            items.clone()
        };

        if let Err(err) = self.storage.persist(&survivors).await {
            tracing::error!("Failed to persist queue after drain: {}", err);
        }
        succeeded.len()
    }

    /// Drops items past the age limit, independent of connectivity.
    ///
    /// Returns the number of dropped items.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let max_age = chrono::Duration::hours(MAX_ITEM_AGE_HOURS);

        let (dropped, survivors) = {
            let mut items = self.items.write().await;
            let before = items.len();
            items.retain(|item| now - item.enqueued_at <= max_age);
            (before - items.len(), items.clone())
        };

        if dropped > 0 {
            tracing::info!("Purged {} stale queued operations", dropped);
            if let Err(err) = self.storage.persist(&survivors).await {
                tracing::error!("Failed to persist queue after purge: {}", err);
            }
        }
        dropped
    }

    /// Read-only snapshot of queue size and the oldest enqueue time.
    pub async fn status(&self) -> QueueStatus {
        let items = self.items.read().await;
        QueueStatus {
            size: items.len(),
            oldest_enqueued_at: items.first().map(|item| item.enqueued_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use praxis_core::clock::ManualClock;
    use praxis_core::error::PraxisError;
    use praxis_infrastructure::WatchConnectivity;
    use std::sync::Mutex;

    // In-memory QueueStorage for testing
    struct MemoryQueueStorage {
        items: Mutex<Vec<QueueItem>>,
    }

    impl MemoryQueueStorage {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                items: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl QueueStorage for MemoryQueueStorage {
        async fn load(&self) -> Vec<QueueItem> {
            self.items.lock().unwrap().clone()
        }

        async fn persist(&self, items: &[QueueItem]) -> anyhow::Result<()> {
            *self.items.lock().unwrap() = items.to_vec();
            Ok(())
        }
    }

    // Dispatcher scripted to fail, recording the order of dispatches.
    struct RecordingDispatcher {
        fail: bool,
        seen: Mutex<Vec<String>>,
    }

    impl RecordingDispatcher {
        fn succeeding() -> Self {
            Self {
                fail: false,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueueDispatcher for RecordingDispatcher {
        async fn dispatch(&self, item: &QueueItem) -> Result<()> {
            self.seen.lock().unwrap().push(item.id.clone());
            if self.fail {
                Err(PraxisError::network("still unreachable"))
            } else {
                Ok(())
            }
        }
    }

    fn start_time() -> chrono::DateTime<chrono::Utc> {
        "2026-01-15T10:00:00Z".parse().unwrap()
    }

    async fn queue_with(
        storage: Arc<MemoryQueueStorage>,
        online: bool,
    ) -> (OfflineQueue, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start_time()));
        let queue = OfflineQueue::load(
            storage,
            Arc::new(WatchConnectivity::new(online)),
            clock.clone(),
        )
        .await;
        (queue, clock)
    }

    fn payload(n: usize) -> serde_json::Value {
        serde_json::json!({ "n": n })
    }

    #[tokio::test]
    async fn test_enqueue_at_capacity_evicts_oldest() {
        let (queue, _) = queue_with(MemoryQueueStorage::new(), true).await;

        let first = queue
            .enqueue(QueueOperation::StartSession, payload(0))
            .await
            .unwrap();
        for n in 1..=MAX_QUEUE_LEN {
            queue
                .enqueue(QueueOperation::StartSession, payload(n))
                .await
                .unwrap();
        }

        let status = queue.status().await;
        assert_eq!(status.size, MAX_QUEUE_LEN);

        // The originally-oldest item is gone; the dispatcher never sees it.
        let dispatcher = RecordingDispatcher::succeeding();
        queue.drain_if_online(&dispatcher).await;
        assert!(!dispatcher.seen().contains(&first));
        assert_eq!(dispatcher.seen().len(), MAX_QUEUE_LEN);
    }

    #[tokio::test]
    async fn test_drain_replays_in_fifo_order_and_removes_successes() {
        let (queue, _) = queue_with(MemoryQueueStorage::new(), true).await;

        let a = queue
            .enqueue(QueueOperation::StartSession, payload(1))
            .await
            .unwrap();
        let b = queue
            .enqueue(QueueOperation::EndConversation, payload(2))
            .await
            .unwrap();

        let dispatcher = RecordingDispatcher::succeeding();
        let replayed = queue.drain_if_online(&dispatcher).await;

        assert_eq!(replayed, 2);
        assert_eq!(dispatcher.seen(), vec![a, b]);
        assert_eq!(queue.status().await.size, 0);
    }

    #[tokio::test]
    async fn test_drain_is_a_noop_while_offline() {
        let (queue, _) = queue_with(MemoryQueueStorage::new(), false).await;
        queue
            .enqueue(QueueOperation::StartSession, payload(1))
            .await
            .unwrap();

        let dispatcher = RecordingDispatcher::succeeding();
        assert_eq!(queue.drain_if_online(&dispatcher).await, 0);
        assert!(dispatcher.seen().is_empty());
        assert_eq!(queue.status().await.size, 1);
    }

    #[tokio::test]
    async fn test_item_is_dropped_after_retry_budget() {
        let (queue, _) = queue_with(MemoryQueueStorage::new(), true).await;
        queue
            .enqueue(QueueOperation::CreateConversation, payload(1))
            .await
            .unwrap();

        let dispatcher = RecordingDispatcher::failing();
        for drain in 1..=MAX_ITEM_RETRIES {
            queue.drain_if_online(&dispatcher).await;
            let expected = if drain < MAX_ITEM_RETRIES { 1 } else { 0 };
            assert_eq!(queue.status().await.size, expected, "after drain {drain}");
        }

        // Gone for good: the next drain sees nothing.
        let fresh = RecordingDispatcher::failing();
        queue.drain_if_online(&fresh).await;
        assert!(fresh.seen().is_empty());
    }

    #[tokio::test]
    async fn test_failure_records_retry_state() {
        let storage = MemoryQueueStorage::new();
        let (queue, _) = queue_with(storage.clone(), true).await;
        queue
            .enqueue(QueueOperation::CreateConversation, payload(1))
            .await
            .unwrap();

        queue.drain_if_online(&RecordingDispatcher::failing()).await;

        let persisted = storage.load().await;
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].retry_count, 1);
        assert!(persisted[0].last_error.as_deref().unwrap().contains("unreachable"));
    }

    #[tokio::test]
    async fn test_purge_drops_items_past_age_limit() {
        let (queue, clock) = queue_with(MemoryQueueStorage::new(), true).await;
        queue
            .enqueue(QueueOperation::UpdateCompletion, payload(1))
            .await
            .unwrap();

        clock.advance(chrono::Duration::hours(MAX_ITEM_AGE_HOURS + 1));
        assert_eq!(queue.purge_expired().await, 1);
        assert_eq!(queue.status().await.size, 0);
    }

    #[tokio::test]
    async fn test_queue_survives_restart() {
        let storage = MemoryQueueStorage::new();
        let (queue, _) = queue_with(storage.clone(), false).await;
        queue
            .enqueue(QueueOperation::EndConversation, payload(7))
            .await
            .unwrap();

        // A second queue over the same storage simulates a restart.
        let (restarted, _) = queue_with(storage, true).await;
        let status = restarted.status().await;
        assert_eq!(status.size, 1);
        assert_eq!(status.oldest_enqueued_at, Some(start_time()));

        let dispatcher = RecordingDispatcher::succeeding();
        assert_eq!(restarted.drain_if_online(&dispatcher).await, 1);
    }

    #[tokio::test]
    async fn test_status_reports_oldest_timestamp() {
        let (queue, clock) = queue_with(MemoryQueueStorage::new(), true).await;
        queue
            .enqueue(QueueOperation::StartSession, payload(1))
            .await
            .unwrap();
        clock.advance(chrono::Duration::minutes(10));
        queue
            .enqueue(QueueOperation::StartSession, payload(2))
            .await
            .unwrap();

        let status = queue.status().await;
        assert_eq!(status.size, 2);
        assert_eq!(status.oldest_enqueued_at, Some(start_time()));
    }
}
