//! Durable single-slot queue storage.
//!
//! The whole offline queue is serialized into one JSON file. Loading never
//! fails: a missing, unreadable or corrupt slot reads as an empty queue
//! (logged), because a broken queue file must not block the application.

use anyhow::{Context, Result};
use async_trait::async_trait;
use praxis_core::queue::{QueueItem, QueueStorage};
use std::path::{Path, PathBuf};
use tokio::fs;

/// One-file queue slot at a fixed path.
pub struct FileQueueStorage {
    path: PathBuf,
}

impl FileQueueStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl QueueStorage for FileQueueStorage {
    async fn load(&self) -> Vec<QueueItem> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::warn!(
                    "Failed to read queue slot {}, starting empty: {}",
                    self.path.display(),
                    err
                );
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(
                    "Corrupt queue slot {}, starting empty: {}",
                    self.path.display(),
                    err
                );
                Vec::new()
            }
        }
    }

    async fn persist(&self, items: &[QueueItem]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create queue slot directory")?;
        }

        let raw = serde_json::to_string(items).context("Failed to serialize queue")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, raw)
            .await
            .with_context(|| format!("Failed to write queue slot {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to move queue slot into place {}", self.path.display()))?;

        Ok(())
    }
}
