//! Administrator-configured provider settings.
//!
//! The settings document is owned by the admin panel; this core only reads
//! and validates it. Values are fetched live on every resolution so admin
//! changes take effect without a restart.
//!
//! The `api_key` is a credential: implementations and callers must never log
//! it or include it in error messages.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Credentials and feature flag for the conversational-AI provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Replica (avatar) id to run conversations with.
    #[serde(default)]
    pub replica_id: String,
    /// Persona id shaping the AI's behavior.
    #[serde(default)]
    pub persona_id: String,
    /// Per-request API key.
    #[serde(default)]
    pub api_key: String,
    /// Master switch for the practice feature.
    #[serde(default)]
    pub enabled: bool,
}

/// Read access to the single provider-settings document.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetches the settings document, `None` if it was never configured.
    async fn provider_settings(&self) -> Result<Option<ProviderSettings>>;
}
