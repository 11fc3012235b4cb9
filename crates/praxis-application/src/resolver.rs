//! Settings and conversational-context resolution.
//!
//! Every remote conversation starts here: the provider credentials must be
//! configured and enabled, and the course must yield a usable conversational
//! context. Validation happens before any remote call is attempted so a
//! misconfigured catalog fails fast with a Config error instead of burning
//! provider quota.

use praxis_core::course::CourseRepository;
use praxis_core::error::{PraxisError, Result};
use praxis_core::settings::{ProviderSettings, SettingsRepository};
use std::sync::Arc;

/// Longest conversational context forwarded to the provider, in characters.
pub const MAX_CONTEXT_CHARS: usize = 1000;

/// Resolves admin-configured provider settings and per-course context.
pub struct SettingsResolver {
    settings: Arc<dyn SettingsRepository>,
    courses: Arc<dyn CourseRepository>,
}

impl SettingsResolver {
    pub fn new(settings: Arc<dyn SettingsRepository>, courses: Arc<dyn CourseRepository>) -> Self {
        Self { settings, courses }
    }

    /// Fetches and validates the provider settings.
    ///
    /// Fails with a Config error if the settings document is missing, the
    /// feature is disabled, or any credential is blank after trimming. The
    /// returned values are trimmed. Error messages name the missing field
    /// but never echo credential values.
    pub async fn provider_settings(&self) -> Result<ProviderSettings> {
        let settings = self
            .settings
            .provider_settings()
            .await
            .map_err(PraxisError::from)?
            .ok_or_else(|| PraxisError::config("AI practice is not configured"))?;

        if !settings.enabled {
            return Err(PraxisError::config("AI practice is disabled"));
        }

        let replica_id = settings.replica_id.trim();
        let persona_id = settings.persona_id.trim();
        let api_key = settings.api_key.trim();

        for (field, value) in [
            ("replica_id", replica_id),
            ("persona_id", persona_id),
            ("api_key", api_key),
        ] {
            if value.is_empty() {
                return Err(PraxisError::config(format!(
                    "Provider settings are missing {field}"
                )));
            }
        }

        Ok(ProviderSettings {
            replica_id: replica_id.to_string(),
            persona_id: persona_id.to_string(),
            api_key: api_key.to_string(),
            enabled: true,
        })
    }

    /// Resolves the conversational context for a course.
    ///
    /// Picks the first non-blank of: the explicit AI context, the legacy
    /// practice context, the course description; falls back to a synthesized
    /// generic prompt naming the course title. The result is truncated to
    /// [`MAX_CONTEXT_CHARS`] characters.
    pub async fn course_context(&self, course_id: &str) -> Result<String> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await
            .map_err(PraxisError::from)?
            .ok_or_else(|| PraxisError::not_found("Course", course_id))?;

        let explicit = [
            course.ai_context.as_deref(),
            course.practice_context.as_deref(),
            Some(course.description.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty());

        let context = match explicit {
            Some(text) => text.to_string(),
            None => {
                tracing::debug!(
                    "Course {} has no context, synthesizing a generic prompt",
                    course_id
                );
                generic_prompt(&course.title)
            }
        };

        Ok(truncate_context(context))
    }
}

fn generic_prompt(course_title: &str) -> String {
    format!(
        "You are a friendly practice partner for the course \"{course_title}\". \
         Help the learner rehearse the course material in conversation, ask one \
         question at a time, and give short, encouraging feedback."
    )
}

/// Truncates to [`MAX_CONTEXT_CHARS`] characters, marking the cut with an
/// ellipsis. Counts characters, not bytes, so multi-byte text never splits.
fn truncate_context(context: String) -> String {
    if context.chars().count() <= MAX_CONTEXT_CHARS {
        return context;
    }
    let mut truncated: String = context.chars().take(MAX_CONTEXT_CHARS - 3).collect();
    truncated.push_str("...");
    truncated
}
