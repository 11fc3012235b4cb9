//! Conversational-AI provider port.
//!
//! The remote provider is reached over HTTP; this trait is the seam the
//! session service calls through, so tests can substitute a scripted
//! provider and the HTTP client stays in its own crate.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Arguments for creating a remote conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRequest {
    /// Replica (avatar) id from the provider settings.
    pub replica_id: String,
    /// Persona id from the provider settings.
    pub persona_id: String,
    /// Free-text prompt guiding the AI during the practice session.
    pub conversational_context: String,
    /// Per-session webhook endpoint for conversation events.
    pub callback_url: String,
}

/// Successful response to a conversation-create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationCreated {
    pub conversation_id: String,
    pub conversation_url: String,
    /// Provider-reported initial status (informational).
    #[serde(default)]
    pub status: String,
}

/// The remote conversational-AI API, reduced to the calls this core makes.
///
/// Implementations enforce the bounded-wait rule: every method carries an
/// explicit timeout, an unbounded remote wait is a defect.
#[async_trait]
pub trait ConversationProvider: Send + Sync {
    /// Creates a conversation. Bounded by a 30-second deadline.
    async fn create_conversation(
        &self,
        api_key: &str,
        request: &ConversationRequest,
    ) -> Result<ConversationCreated>;

    /// Ends a conversation. Bounded by a 15-second deadline.
    ///
    /// A conversation that is already ended or unknown (remote 404/409) is
    /// treated as successfully ended.
    async fn end_conversation(&self, api_key: &str, conversation_id: &str) -> Result<()>;

    /// Probes the provider's health endpoint. Bounded by a 10-second
    /// deadline.
    async fn health(&self, api_key: &str) -> Result<()>;
}
