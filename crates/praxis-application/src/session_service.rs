//! Practice-session lifecycle service.
//!
//! Owns the session state machine and TTL enforcement: sessions are created
//! in `confirmed` state, mutated only through [`SessionService::update_session`],
//! and can never reach `completed` once their deadline has passed. Remote
//! provider calls run through the retry engine; persistence goes through the
//! injected repositories so the service itself stays storage-agnostic.

use crate::resolver::SettingsResolver;
use praxis_core::clock::Clock;
use praxis_core::error::{PraxisError, Result};
use praxis_core::provider::{ConversationCreated, ConversationProvider, ConversationRequest};
use praxis_core::retry::{RetryPolicy, retry_with_backoff};
use praxis_core::session::{
    ClientInfo, CompletionInput, PracticeSession, SessionMetadata, SessionRepository,
    SessionStatus, SessionUpdate,
};
use praxis_core::user::{CompletionRecord, UserRepository};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::sync::Arc;
use uuid::Uuid;

/// TTL granted when the caller does not ask for one.
pub const DEFAULT_TTL_SECONDS: u32 = 180;
/// Hard upper bound on a session TTL.
pub const MAX_TTL_SECONDS: u32 = 3600;

const CALLBACK_SUFFIX_LEN: usize = 8;

/// Orchestrates the practice-session lifecycle.
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    resolver: Arc<SettingsResolver>,
    provider: Arc<dyn ConversationProvider>,
    clock: Arc<dyn Clock>,
    /// Origin prepended to provider callback URLs.
    public_origin: String,
    retry_policy: RetryPolicy,
}

impl SessionService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        resolver: Arc<SettingsResolver>,
        provider: Arc<dyn ConversationProvider>,
        clock: Arc<dyn Clock>,
        public_origin: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            users,
            resolver,
            provider,
            clock,
            public_origin: public_origin.into().trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy for remote calls.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Creates a new session in `confirmed` state and returns its id.
    ///
    /// # Errors
    ///
    /// Returns a Config error when either id is blank or the TTL is outside
    /// `(0, 3600]`; nothing is persisted in that case.
    pub async fn start_session(
        &self,
        user_id: &str,
        course_id: &str,
        ttl_seconds: Option<u32>,
        client: ClientInfo,
    ) -> Result<String> {
        if user_id.trim().is_empty() || course_id.trim().is_empty() {
            return Err(PraxisError::config(
                "start_session requires a user id and a course id",
            ));
        }
        let ttl = ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS);
        if ttl == 0 || ttl > MAX_TTL_SECONDS {
            return Err(PraxisError::config(format!(
                "Session TTL must be within (0, {MAX_TTL_SECONDS}] seconds, got {ttl}"
            )));
        }

        let now = self.clock.now();
        let session = PracticeSession {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            conversation_id: None,
            conversation_url: None,
            status: SessionStatus::Confirmed,
            confirmed_at: Some(now),
            started_at: None,
            completed_at: None,
            expires_at: now + chrono::Duration::seconds(i64::from(ttl)),
            ttl_seconds: ttl,
            accuracy_score: None,
            duration_seconds: None,
            updated_at: now,
            metadata: SessionMetadata {
                user_agent: client.user_agent,
                device: client.device,
                ..SessionMetadata::default()
            },
        };

        self.sessions.save(&session).await?;
        tracing::info!(
            "Session {} confirmed for user {} on course {} (ttl {}s)",
            session.id,
            user_id,
            course_id,
            ttl
        );
        Ok(session.id)
    }

    /// Creates the remote conversation for a confirmed session.
    ///
    /// Resolves settings and course context, builds the per-session callback
    /// URL and issues the provider call through the retry engine. On success
    /// the session is updated with the conversation identity; on failure it
    /// is moved to `failed` with the error recorded, and the error is
    /// re-raised.
    pub async fn create_conversation(
        &self,
        course_id: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<ConversationCreated> {
        let settings = self.resolver.provider_settings().await?;
        let context = self.resolver.course_context(course_id).await?;
        let callback_url = self.build_callback_url(user_id, session_id);

        let request = ConversationRequest {
            replica_id: settings.replica_id.clone(),
            persona_id: settings.persona_id.clone(),
            conversational_context: context,
            callback_url: callback_url.clone(),
        };

        let outcome = retry_with_backoff(&self.retry_policy, || {
            self.provider.create_conversation(&settings.api_key, &request)
        })
        .await;

        match outcome {
            Ok(created) => {
                self.update_session(
                    session_id,
                    SessionUpdate {
                        conversation_id: Some(created.conversation_id.clone()),
                        conversation_url: Some(created.conversation_url.clone()),
                        callback_url: Some(callback_url),
                        ..SessionUpdate::default()
                    },
                )
                .await?;
                tracing::info!(
                    "Conversation {} created for session {}",
                    created.conversation_id,
                    session_id
                );
                Ok(created)
            }
            Err(err) => {
                let attempts = match &err {
                    PraxisError::RetriesExhausted { attempts, .. } => *attempts,
                    _ => 1,
                };
                // Record the failure on the session; the original error wins
                // even if the bookkeeping write fails.
                if let Err(update_err) = self
                    .update_session(
                        session_id,
                        SessionUpdate {
                            status: Some(SessionStatus::Failed),
                            retry_count: Some(attempts),
                            last_error: Some(err.to_string()),
                            ..SessionUpdate::default()
                        },
                    )
                    .await
                {
                    tracing::error!(
                        "Failed to record conversation failure on session {}: {}",
                        session_id,
                        update_err
                    );
                }
                Err(err)
            }
        }
    }

    /// Applies a partial update to a session.
    ///
    /// Enforces TTL expiry: once the deadline has passed, any update on a
    /// non-completed session is forced to `expired` (unless it already asks
    /// for `expired`). A transition to `started` stamps `started_at` and the
    /// confirmation delay; every update stamps `updated_at`.
    pub async fn update_session(
        &self,
        session_id: &str,
        update: SessionUpdate,
    ) -> Result<PracticeSession> {
        let mut session = self.load_session(session_id).await?;
        let now = self.clock.now();
        let mut update = update;

        if now > session.expires_at
            && session.status != SessionStatus::Completed
            && update.status != Some(SessionStatus::Expired)
        {
            tracing::info!(
                "Session {} is past its deadline ({}), forcing expired",
                session_id,
                session.expires_at
            );
            update.status = Some(SessionStatus::Expired);
        }

        if let Some(status) = update.status {
            if status == SessionStatus::Started && session.status != SessionStatus::Started {
                session.started_at = Some(now);
                if let Some(confirmed_at) = session.confirmed_at {
                    session.metadata.confirmation_delay_seconds =
                        Some((now - confirmed_at).num_seconds().max(0));
                }
            }
            if status == SessionStatus::Completed {
                session.completed_at = Some(now);
            }
            session.status = status;
        }
        if let Some(conversation_id) = update.conversation_id {
            session.conversation_id = Some(conversation_id);
        }
        if let Some(conversation_url) = update.conversation_url {
            session.conversation_url = Some(conversation_url);
        }
        if let Some(callback_url) = update.callback_url {
            session.metadata.callback_url = Some(callback_url);
        }
        if let Some(accuracy_score) = update.accuracy_score {
            session.accuracy_score = Some(accuracy_score);
        }
        if let Some(duration_seconds) = update.duration_seconds {
            session.duration_seconds = Some(duration_seconds);
        }
        if let Some(retry_count) = update.retry_count {
            session.metadata.retry_count = retry_count;
        }
        if let Some(last_error) = update.last_error {
            session.metadata.last_error = Some(last_error);
        }
        session.updated_at = now;

        self.sessions.save(&session).await?;
        Ok(session)
    }

    /// Completes a session and records the outcome on the user.
    ///
    /// # Errors
    ///
    /// - Config error if the session has lost its user/course linkage.
    /// - Timeout error if the deadline has passed; the session is forced to
    ///   `expired` first.
    pub async fn complete_session(
        &self,
        session_id: &str,
        input: CompletionInput,
    ) -> Result<()> {
        let session = self.load_session(session_id).await?;
        if session.user_id.trim().is_empty() || session.course_id.trim().is_empty() {
            return Err(PraxisError::config(format!(
                "Session {session_id} has no user/course linkage"
            )));
        }

        let now = self.clock.now();
        if now > session.expires_at {
            self.update_session(
                session_id,
                SessionUpdate {
                    status: Some(SessionStatus::Expired),
                    ..SessionUpdate::default()
                },
            )
            .await?;
            return Err(PraxisError::timeout(format!(
                "Session {session_id} expired before completion"
            )));
        }

        let accuracy_score = input.accuracy_score.map(|score| {
            if (0.0..=100.0).contains(&score) {
                score
            } else {
                tracing::warn!(
                    "Accuracy score {} for session {} outside [0, 100], clamping",
                    score,
                    session_id
                );
                score.clamp(0.0, 100.0)
            }
        });

        let duration_seconds = input.duration_seconds.or_else(|| {
            session
                .started_at
                .or(session.confirmed_at)
                .map(|from| (now - from).num_seconds().max(0))
        });

        let updated = self
            .update_session(
                session_id,
                SessionUpdate {
                    status: Some(SessionStatus::Completed),
                    accuracy_score,
                    duration_seconds,
                    conversation_id: input.conversation_id,
                    ..SessionUpdate::default()
                },
            )
            .await?;

        let record = CompletionRecord {
            completed: true,
            accuracy_score,
            conversation_id: updated.conversation_id.clone(),
            completed_at: now,
        };
        self.users
            .save_completion(&session.user_id, &session.course_id, &record)
            .await?;

        tracing::info!(
            "Session {} completed for user {} on course {} (accuracy {:?})",
            session_id,
            session.user_id,
            session.course_id,
            accuracy_score
        );
        Ok(())
    }

    /// Ends the remote conversation.
    ///
    /// Idempotent: a conversation the provider no longer knows (404) or has
    /// already ended (409) counts as success.
    pub async fn end_conversation(&self, conversation_id: &str) -> Result<()> {
        let settings = self.resolver.provider_settings().await?;
        retry_with_backoff(&self.retry_policy, || {
            self.provider.end_conversation(&settings.api_key, conversation_id)
        })
        .await
    }

    /// Probes the provider's health endpoint with the configured key.
    pub async fn provider_health(&self) -> Result<()> {
        let settings = self.resolver.provider_settings().await?;
        self.provider.health(&settings.api_key).await
    }

    async fn load_session(&self, session_id: &str) -> Result<PracticeSession> {
        self.sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| PraxisError::not_found("Session", session_id))
    }

    /// Builds the per-session callback URL:
    /// `{origin}/api/tavus/callback/{user}/{session}/{timestamp_ms}/{suffix}`.
    ///
    /// The timestamp and random suffix make the URL unique per attempt, so a
    /// stale webhook from an earlier attempt can be told apart.
    fn build_callback_url(&self, user_id: &str, session_id: &str) -> String {
        let timestamp = self.clock.now().timestamp_millis();
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CALLBACK_SUFFIX_LEN)
            .map(char::from)
            .collect();
        format!(
            "{}/api/tavus/callback/{}/{}/{}/{}",
            self.public_origin, user_id, session_id, timestamp, suffix
        )
    }
}
