//! JSON document store on the local filesystem.
//!
//! Stands in for the managed document database: documents are addressed by
//! (collection, id) and stored as `{base_dir}/{collection}/{id}.json`.
//! Writes go to a temp file first and are renamed into place, so a crashed
//! write never leaves a half-written document behind.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Document-style storage keyed by (collection, id).
#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    base_dir: PathBuf,
}

impl JsonDocumentStore {
    /// Creates a store rooted at `base_dir`, creating the directory if
    /// needed.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .await
            .context("Failed to create document store directory")?;
        Ok(Self { base_dir })
    }

    fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.base_dir.join(collection).join(format!("{id}.json"))
    }

    /// Loads a document, `None` if it does not exist.
    pub async fn load<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        let path = self.document_path(collection, id);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read document {}", path.display()));
            }
        };

        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse document {}", path.display()))?;
        Ok(Some(value))
    }

    /// Saves a document, replacing any previous revision atomically.
    pub async fn save<T: Serialize>(&self, collection: &str, id: &str, value: &T) -> Result<()> {
        let path = self.document_path(collection, id);
        let parent = path
            .parent()
            .expect("document path always has a collection parent");
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create collection directory {collection}"))?;

        let raw = serde_json::to_string_pretty(value).context("Failed to serialize document")?;

        // Write-then-rename keeps readers from ever seeing a torn document.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, raw)
            .await
            .with_context(|| format!("Failed to write document {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to move document into place {}", path.display()))?;

        Ok(())
    }
}
