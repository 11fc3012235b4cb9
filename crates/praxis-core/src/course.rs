//! Course catalog entries, read-only from this core's point of view.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A course as stored by the catalog admin panel.
///
/// Only the fields the context resolver consumes are modeled here; the
/// admin-facing course document carries more.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Explicit conversational context for the AI practice partner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_context: Option<String>,
    /// Legacy context field, still honored when `ai_context` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_context: Option<String>,
}

/// Read access to the course catalog.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Finds a course by its ID.
    async fn find_by_id(&self, course_id: &str) -> Result<Option<Course>>;
}
