//! Practice-session domain model.
//!
//! A [`PracticeSession`] records one attempt at an AI practice conversation
//! for a (user, course) pair: its lifecycle status, the remote conversation
//! identity once established, and TTL accounting. Sessions are created in
//! `confirmed` state and only ever transition forward; they are never
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a practice session.
///
/// The main line is `confirmed → started → in_progress → completed`.
/// `failed`, `abandoned` and `expired` are reachable from any non-terminal
/// state. All of `completed`, `failed`, `abandoned` and `expired` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Confirmed,
    Started,
    InProgress,
    Completed,
    Failed,
    Abandoned,
    Expired,
}

impl SessionStatus {
    /// Whether no further transitions are allowed from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Abandoned | Self::Expired
        )
    }

    /// Stable string form, matching the persisted representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Started => "started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client environment and bookkeeping attached to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Browser user-agent string reported by the initiating client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Coarse device class ("desktop", "mobile", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Seconds between confirmation and the actual start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_delay_seconds: Option<i64>,
    /// Callback URL handed to the provider for this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Remote-call retries spent on behalf of this session.
    #[serde(default)]
    pub retry_count: u32,
    /// Last remote error observed for this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// One attempt at an AI practice conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Owning user id
    pub user_id: String,
    /// Course the practice belongs to
    pub course_id: String,
    /// Remote conversation id, set once the provider call succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Remote conversation URL for the client to join
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_url: Option<String>,
    /// Current lifecycle status
    pub status: SessionStatus,
    /// When the user confirmed the practice prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When the conversation actually started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the session reached `completed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Hard deadline after which the session can only expire
    pub expires_at: DateTime<Utc>,
    /// Time-to-live granted at creation, in seconds
    pub ttl_seconds: u32,
    /// Accuracy score in [0, 100], recorded on completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_score: Option<f64>,
    /// Conversation duration in seconds, recorded on completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    /// Timestamp of the last mutation
    pub updated_at: DateTime<Utc>,
    /// Client environment and bookkeeping
    #[serde(default)]
    pub metadata: SessionMetadata,
}

/// Client environment captured when a session is started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub device: Option<String>,
}

/// A partial update to a session.
///
/// Absent (`None`) fields leave the stored value untouched, so partial
/// updates never clobber concurrent data the caller did not mean to touch.
/// Status transitions to `started` and `completed` stamp `started_at` /
/// `completed_at` as a side effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub status: Option<SessionStatus>,
    pub conversation_id: Option<String>,
    pub conversation_url: Option<String>,
    pub callback_url: Option<String>,
    pub accuracy_score: Option<f64>,
    pub duration_seconds: Option<i64>,
    pub retry_count: Option<u32>,
    pub last_error: Option<String>,
}

/// Caller-supplied outcome data for completing a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionInput {
    /// Accuracy score; clamped into [0, 100] on write.
    pub accuracy_score: Option<f64>,
    /// Duration in seconds; derived from `started_at` when absent.
    pub duration_seconds: Option<i64>,
    /// Remote conversation id, when the caller knows it.
    pub conversation_id: Option<String>,
}
