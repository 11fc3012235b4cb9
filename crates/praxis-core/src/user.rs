//! User-owned completion records.
//!
//! Completion outcomes are denormalized onto the user entity, keyed by
//! course id: one record per (user, course) pair, overwritten on retake.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized practice outcome for one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Whether the practice conversation was completed.
    pub completed: bool,
    /// Accuracy score in [0, 100], if one was reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_score: Option<f64>,
    /// Remote conversation id the outcome came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// When the completion was recorded.
    pub completed_at: DateTime<Utc>,
}

/// Repository for the user entity's completion records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the completion record for a (user, course) pair, if any.
    async fn completion(&self, user_id: &str, course_id: &str)
    -> Result<Option<CompletionRecord>>;

    /// Writes the completion record for a (user, course) pair, replacing
    /// any previous record for that course.
    async fn save_completion(
        &self,
        user_id: &str,
        course_id: &str,
        record: &CompletionRecord,
    ) -> Result<()>;
}
