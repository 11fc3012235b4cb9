//! Document-store backed UserRepository implementation.
//!
//! Completion records are denormalized into the user document as a map
//! keyed by course id, matching the shape the course viewer reads.

use crate::json_store::JsonDocumentStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use praxis_core::user::{CompletionRecord, UserRepository};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const COLLECTION: &str = "users";

/// The slice of the user document this core reads and writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserDocument {
    #[serde(default)]
    completions: HashMap<String, CompletionRecord>,
}

/// Stores completion records inside `users/{id}.json`.
pub struct JsonUserRepository {
    store: JsonDocumentStore,
}

impl JsonUserRepository {
    pub fn new(store: JsonDocumentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for JsonUserRepository {
    async fn completion(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<CompletionRecord>> {
        let document: Option<UserDocument> = self
            .store
            .load(COLLECTION, user_id)
            .await
            .context("Failed to load user document")?;

        Ok(document.and_then(|doc| doc.completions.get(course_id).cloned()))
    }

    async fn save_completion(
        &self,
        user_id: &str,
        course_id: &str,
        record: &CompletionRecord,
    ) -> Result<()> {
        let mut document: UserDocument = self
            .store
            .load(COLLECTION, user_id)
            .await
            .context("Failed to load user document")?
            .unwrap_or_default();

        // One record per course; a retake replaces the previous outcome.
        document
            .completions
            .insert(course_id.to_string(), record.clone());

        self.store
            .save(COLLECTION, user_id, &document)
            .await
            .context("Failed to save user document")
    }
}
