//! Document-store backed SettingsRepository implementation.

use crate::json_store::JsonDocumentStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use praxis_core::settings::{ProviderSettings, SettingsRepository};

const COLLECTION: &str = "settings";
const DOCUMENT_ID: &str = "provider";

/// Reads the single provider-settings document (`settings/provider.json`).
///
/// The document is read on every resolution rather than cached, so an admin
/// edit takes effect on the next practice attempt.
pub struct JsonSettingsRepository {
    store: JsonDocumentStore,
}

impl JsonSettingsRepository {
    pub fn new(store: JsonDocumentStore) -> Self {
        Self { store }
    }

    /// Writes the settings document (admin panel / test seeding).
    pub async fn save(&self, settings: &ProviderSettings) -> Result<()> {
        self.store
            .save(COLLECTION, DOCUMENT_ID, settings)
            .await
            .context("Failed to save provider settings")
    }
}

#[async_trait]
impl SettingsRepository for JsonSettingsRepository {
    async fn provider_settings(&self) -> Result<Option<ProviderSettings>> {
        self.store
            .load(COLLECTION, DOCUMENT_ID)
            .await
            .context("Failed to load provider settings")
    }
}
