//! Offline-queue domain model.
//!
//! A queue item is a durable record of one deferred operation: which entry
//! point to replay, its opaque JSON payload, and the retry bookkeeping that
//! decides when the item is given up on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The deferrable operations the queue knows how to replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOperation {
    StartSession,
    CreateConversation,
    EndConversation,
    UpdateCompletion,
}

impl QueueOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartSession => "start_session",
            Self::CreateConversation => "create_conversation",
            Self::EndConversation => "end_conversation",
            Self::UpdateCompletion => "update_completion",
        }
    }
}

impl std::fmt::Display for QueueOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A durable record of a deferred operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Unique item identifier (UUID format)
    pub id: String,
    /// Which entry point to replay
    pub operation: QueueOperation,
    /// Operation arguments, serialized by the enqueuing entry point
    pub payload: serde_json::Value,
    /// When the item entered the queue
    pub enqueued_at: DateTime<Utc>,
    /// Failed replay attempts so far
    #[serde(default)]
    pub retry_count: u32,
    /// Message of the last failed replay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Read-only introspection of the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Number of items currently queued.
    pub size: usize,
    /// Enqueue time of the oldest item, if any.
    pub oldest_enqueued_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Typed payloads
//
// Each deferrable entry point serializes one of these into `QueueItem::payload`
// and the dispatcher decodes it back, so the queue itself stays schema-free.
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartSessionPayload {
    pub user_id: String,
    pub course_id: String,
    pub ttl_seconds: u32,
    #[serde(default)]
    pub client: crate::session::ClientInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateConversationPayload {
    pub course_id: String,
    pub user_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndConversationPayload {
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCompletionPayload {
    pub session_id: String,
    #[serde(default)]
    pub completion: crate::session::CompletionInput,
}
