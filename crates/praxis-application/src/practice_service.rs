//! High-level practice entry points.
//!
//! `PracticeService` is what the view layer calls: every entry point is
//! offline-aware (returning [`Dispatch`] outcomes through the gateway), and
//! the service doubles as the [`QueueDispatcher`] that replays deferred
//! operations into the same session-service entry points once connectivity
//! returns.

use crate::gateway::{Dispatch, OfflineGateway};
use crate::offline_queue::{OfflineQueue, QueueDispatcher};
use crate::session_service::{DEFAULT_TTL_SECONDS, SessionService};
use async_trait::async_trait;
use praxis_core::connectivity::ConnectivityMonitor;
use praxis_core::error::Result;
use praxis_core::provider::ConversationCreated;
use praxis_core::queue::{
    CreateConversationPayload, EndConversationPayload, QueueItem, QueueOperation, QueueStatus,
    StartSessionPayload, UpdateCompletionPayload,
};
use praxis_core::session::{ClientInfo, CompletionInput};
use std::sync::Arc;

/// Interval of the stale-item cleanup sweep.
const CLEANUP_INTERVAL_SECS: u64 = 3600;

/// Offline-aware facade over the session service and queue.
pub struct PracticeService {
    sessions: Arc<SessionService>,
    queue: Arc<OfflineQueue>,
    gateway: OfflineGateway,
    connectivity: Arc<dyn ConnectivityMonitor>,
}

impl PracticeService {
    pub fn new(
        sessions: Arc<SessionService>,
        queue: Arc<OfflineQueue>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Self {
        Self {
            gateway: OfflineGateway::new(queue.clone(), connectivity.clone()),
            sessions,
            queue,
            connectivity,
        }
    }

    /// Starts a practice session, deferring when offline.
    pub async fn begin_practice(
        &self,
        user_id: &str,
        course_id: &str,
        ttl_seconds: Option<u32>,
        client: ClientInfo,
    ) -> Result<Dispatch<String>> {
        let payload = serde_json::to_value(StartSessionPayload {
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            ttl_seconds: ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS),
            client: client.clone(),
        })?;
        self.gateway
            .execute_or_queue(QueueOperation::StartSession, payload, || {
                self.sessions
                    .start_session(user_id, course_id, ttl_seconds, client)
            })
            .await
    }

    /// Creates the remote conversation for a session, deferring when offline
    /// or when the provider stays unreachable past the retry budget.
    pub async fn request_conversation(
        &self,
        course_id: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Dispatch<ConversationCreated>> {
        let payload = serde_json::to_value(CreateConversationPayload {
            course_id: course_id.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        })?;
        self.gateway
            .execute_or_queue(QueueOperation::CreateConversation, payload, || {
                self.sessions
                    .create_conversation(course_id, user_id, session_id)
            })
            .await
    }

    /// Ends the remote conversation, deferring when offline.
    pub async fn finish_conversation(&self, conversation_id: &str) -> Result<Dispatch<()>> {
        let payload = serde_json::to_value(EndConversationPayload {
            conversation_id: conversation_id.to_string(),
        })?;
        self.gateway
            .execute_or_queue(QueueOperation::EndConversation, payload, || {
                self.sessions.end_conversation(conversation_id)
            })
            .await
    }

    /// Completes a session and records the outcome, deferring when offline.
    pub async fn record_completion(
        &self,
        session_id: &str,
        completion: CompletionInput,
    ) -> Result<Dispatch<()>> {
        let payload = serde_json::to_value(UpdateCompletionPayload {
            session_id: session_id.to_string(),
            completion: completion.clone(),
        })?;
        self.gateway
            .execute_or_queue(QueueOperation::UpdateCompletion, payload, || {
                self.sessions.complete_session(session_id, completion)
            })
            .await
    }

    /// Probes the provider's health endpoint.
    pub async fn provider_health(&self) -> Result<()> {
        self.sessions.provider_health().await
    }

    /// Read-only queue introspection for diagnostics views.
    pub async fn queue_status(&self) -> QueueStatus {
        self.queue.status().await
    }

    /// Replays queued operations now (no-op while offline).
    pub async fn drain_queue(&self) -> usize {
        self.queue.drain_if_online(self).await
    }

    /// Starts the background queue triggers.
    ///
    /// One spawned task owns both triggers: a drain on every offline→online
    /// transition (plus one at startup for operations left over from the
    /// previous run) and an hourly stale-item purge that runs regardless of
    /// connectivity.
    pub fn start_background_triggers(self: &Arc<Self>) {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::time::Duration;
        use tokio::time::interval;

        // Prevent multiple trigger tasks
        static TRIGGERS_RUNNING: AtomicBool = AtomicBool::new(false);
        if TRIGGERS_RUNNING.swap(true, Ordering::SeqCst) {
            tracing::warn!("[QueueTriggers] already running, skipping");
            return;
        }

        let service = Arc::clone(self);

        tokio::spawn(async move {
            let mut online_rx = service.connectivity.subscribe();
            let mut was_online = *online_rx.borrow();
            let mut ticker = interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));
            tracing::info!(target: "offline_queue", "Queue triggers started");

            // Replay anything a previous run left behind.
            service.drain_queue().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        service.queue.purge_expired().await;
                    }
                    changed = online_rx.changed() => {
                        if changed.is_err() {
                            tracing::debug!(target: "offline_queue", "Connectivity source dropped, stopping triggers");
                            break;
                        }
                        let online = *online_rx.borrow_and_update();
                        if online && !was_online {
                            tracing::info!(target: "offline_queue", "Back online, draining queue");
                            service.drain_queue().await;
                        }
                        was_online = online;
                    }
                }
            }
        });
    }
}

#[async_trait]
impl QueueDispatcher for PracticeService {
    /// Replays one queued operation into the matching entry point.
    ///
    /// Replays call the session service directly, not the gateway: the queue
    /// already owns the retry bookkeeping, re-enqueueing here would loop.
    async fn dispatch(&self, item: &QueueItem) -> Result<()> {
        match item.operation {
            QueueOperation::StartSession => {
                let payload: StartSessionPayload = serde_json::from_value(item.payload.clone())?;
                self.sessions
                    .start_session(
                        &payload.user_id,
                        &payload.course_id,
                        Some(payload.ttl_seconds),
                        payload.client,
                    )
                    .await
                    .map(|_| ())
            }
            QueueOperation::CreateConversation => {
                let payload: CreateConversationPayload =
                    serde_json::from_value(item.payload.clone())?;
                self.sessions
                    .create_conversation(
                        &payload.course_id,
                        &payload.user_id,
                        &payload.session_id,
                    )
                    .await
                    .map(|_| ())
            }
            QueueOperation::EndConversation => {
                let payload: EndConversationPayload =
                    serde_json::from_value(item.payload.clone())?;
                self.sessions.end_conversation(&payload.conversation_id).await
            }
            QueueOperation::UpdateCompletion => {
                let payload: UpdateCompletionPayload =
                    serde_json::from_value(item.payload.clone())?;
                self.sessions
                    .complete_session(&payload.session_id, payload.completion)
                    .await
            }
        }
    }
}
