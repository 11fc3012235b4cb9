//! HTTP client for the Tavus conversational-AI API.
//!
//! Covers the three calls the core makes: create a conversation, end a
//! conversation, and probe health. Every request carries an explicit
//! timeout and the per-request `x-api-key` header; responses are mapped
//! into the [`PraxisError`] taxonomy so the retry engine can classify them.

use async_trait::async_trait;
use praxis_core::error::{PraxisError, Result};
use praxis_core::provider::{ConversationCreated, ConversationProvider, ConversationRequest};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://tavusapi.com";

const CREATE_TIMEOUT: Duration = Duration::from_secs(30);
const END_TIMEOUT: Duration = Duration::from_secs(15);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the provider's `/v2` conversation API.
#[derive(Clone)]
pub struct TavusClient {
    client: Client,
    base_url: String,
}

impl TavusClient {
    /// Creates a client against the production API host.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client against a specific host (staging, local stub).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for TavusClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationProvider for TavusClient {
    async fn create_conversation(
        &self,
        api_key: &str,
        request: &ConversationRequest,
    ) -> Result<ConversationCreated> {
        let url = format!("{}/v2/conversations", self.base_url);

        let body = CreateConversationBody {
            replica_id: &request.replica_id,
            persona_id: &request.persona_id,
            conversational_context: &request.conversational_context,
            callback_url: &request.callback_url,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .json(&body)
            .timeout(CREATE_TIMEOUT)
            .send()
            .await
            .map_err(|err| map_transport_error("create conversation", &err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, &body));
        }

        let created: CreateConversationResponse = response.json().await.map_err(|err| {
            PraxisError::Serialization {
                format: "JSON".to_string(),
                message: format!("Failed to parse create-conversation response: {err}"),
            }
        })?;

        Ok(ConversationCreated {
            conversation_id: created.conversation_id,
            conversation_url: created.conversation_url,
            status: created.status.unwrap_or_default(),
        })
    }

    async fn end_conversation(&self, api_key: &str, conversation_id: &str) -> Result<()> {
        let url = format!("{}/v2/conversations/{}/end", self.base_url, conversation_id);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .timeout(END_TIMEOUT)
            .send()
            .await
            .map_err(|err| map_transport_error("end conversation", &err))?;

        let status = response.status();
        if status.is_success() || end_status_is_already_terminal(status) {
            if end_status_is_already_terminal(status) {
                tracing::debug!(
                    "Conversation {} already ended or unknown ({}), treating as success",
                    conversation_id,
                    status
                );
            }
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        Err(map_http_error(status, &body))
    }

    async fn health(&self, api_key: &str) -> Result<()> {
        let url = format!("{}/v2/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", api_key)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|err| map_transport_error("health probe", &err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, &body));
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct CreateConversationBody<'a> {
    replica_id: &'a str,
    persona_id: &'a str,
    conversational_context: &'a str,
    callback_url: &'a str,
}

#[derive(Deserialize)]
struct CreateConversationResponse {
    conversation_id: String,
    conversation_url: String,
    #[serde(default)]
    status: Option<String>,
}

/// A 404/409 on the end call means the conversation is already in a terminal
/// state remotely; ending is idempotent.
fn end_status_is_already_terminal(status: StatusCode) -> bool {
    matches!(status, StatusCode::NOT_FOUND | StatusCode::CONFLICT)
}

fn map_transport_error(operation: &str, err: &reqwest::Error) -> PraxisError {
    if err.is_timeout() {
        PraxisError::timeout(format!("{operation} request timed out: {err}"))
    } else {
        PraxisError::network(format!("{operation} request failed: {err}"))
    }
}

/// Maps a non-success HTTP status into the error taxonomy.
///
/// 402/429 are account limits, other 4xx are request errors, 5xx are
/// transient server errors. The provider wraps failures in a JSON body with
/// a `message` field when it can; fall back to the raw body otherwise.
fn map_http_error(status: StatusCode, body: &str) -> PraxisError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .or_else(|| json.get("error"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or_else(|| body.to_string());

    match status {
        StatusCode::PAYMENT_REQUIRED | StatusCode::TOO_MANY_REQUESTS => {
            PraxisError::limit(message)
        }
        _ => PraxisError::api(status.as_u16(), message),
    }
}
