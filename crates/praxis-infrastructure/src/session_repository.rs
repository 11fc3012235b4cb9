//! Document-store backed SessionRepository implementation.

use crate::json_store::JsonDocumentStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use praxis_core::session::{PracticeSession, SessionRepository};

const COLLECTION: &str = "sessions";

/// Stores each session as one JSON document under `sessions/{id}.json`.
pub struct JsonSessionRepository {
    store: JsonDocumentStore,
}

impl JsonSessionRepository {
    pub fn new(store: JsonDocumentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SessionRepository for JsonSessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<PracticeSession>> {
        self.store
            .load(COLLECTION, session_id)
            .await
            .context("Failed to load session")
    }

    async fn save(&self, session: &PracticeSession) -> Result<()> {
        self.store
            .save(COLLECTION, &session.id, session)
            .await
            .context("Failed to save session")
    }
}
