//! Offline-aware execution gateway.
//!
//! Callers get an explicit outcome instead of an exception to introspect:
//! [`Dispatch::Completed`] with the value, or [`Dispatch::Deferred`] with the
//! queue item id when the operation was parked for a later drain. Only
//! non-recoverable failures surface as errors.

use crate::offline_queue::OfflineQueue;
use praxis_core::connectivity::ConnectivityMonitor;
use praxis_core::error::Result;
use praxis_core::queue::QueueOperation;
use std::future::Future;
use std::sync::Arc;

/// Outcome of an offline-aware operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch<T> {
    /// The operation ran to completion.
    Completed(T),
    /// The operation was queued for replay once connectivity allows.
    Deferred { queue_id: String },
}

impl<T> Dispatch<T> {
    /// Returns the completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Deferred { .. } => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred { .. })
    }
}

/// Routes operations directly or into the offline queue.
pub struct OfflineGateway {
    queue: Arc<OfflineQueue>,
    connectivity: Arc<dyn ConnectivityMonitor>,
}

impl OfflineGateway {
    pub fn new(queue: Arc<OfflineQueue>, connectivity: Arc<dyn ConnectivityMonitor>) -> Self {
        Self {
            queue,
            connectivity,
        }
    }

    /// Runs `run` if online, otherwise enqueues `payload` for later.
    ///
    /// An online failure that is still retryable (the session service has
    /// already spent its retry budget by the time it reports one) is parked
    /// in the queue with a warning instead of surfacing as a hard failure.
    /// Non-retryable failures propagate untouched.
    pub async fn execute_or_queue<T, F, Fut>(
        &self,
        operation: QueueOperation,
        payload: serde_json::Value,
        run: F,
    ) -> Result<Dispatch<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.connectivity.is_online() {
            let queue_id = self.queue.enqueue(operation, payload).await?;
            tracing::info!("Offline, deferred {} as {}", operation, queue_id);
            return Ok(Dispatch::Deferred { queue_id });
        }

        match run().await {
            Ok(value) => Ok(Dispatch::Completed(value)),
            Err(err) if err.retryable() => {
                tracing::warn!(
                    "{} failed after retries, parking in offline queue: {}",
                    operation,
                    err
                );
                let queue_id = self.queue.enqueue(operation, payload).await?;
                Ok(Dispatch::Deferred { queue_id })
            }
            Err(err) => Err(err),
        }
    }
}
