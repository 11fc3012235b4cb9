//! Application configuration.
//!
//! Loaded from `config.toml` in the praxis config directory (or an explicit
//! path). Missing file or missing fields fall back to defaults so a fresh
//! checkout runs without any setup.

use crate::paths::PraxisPaths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_public_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_provider_base_url() -> String {
    "https://tavusapi.com".to_string()
}

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Public origin used to build provider callback URLs.
    #[serde(default = "default_public_origin")]
    pub public_origin: String,
    /// Base URL of the conversational-AI provider API.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
    /// Override for the document-store data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            public_origin: default_public_origin(),
            provider_base_url: default_provider_base_url(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads the configuration from an explicit TOML file.
    ///
    /// A missing file yields the defaults; a present but malformed file is
    /// an error (silently ignoring an admin's edits would be worse).
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read config file {}", path.display()))
            }
        }
    }

    /// Loads the configuration from the platform config directory.
    pub async fn load_default() -> Result<Self> {
        let path = PraxisPaths::config_file()
            .map_err(|e| anyhow::anyhow!("Failed to resolve config path: {}", e))?;
        Self::load(path).await
    }

    /// Resolves the document-store data directory.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        PraxisPaths::data_dir().map_err(|e| anyhow::anyhow!("Failed to resolve data dir: {}", e))
    }
}
