//! Unified path management for praxis data and configuration.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for praxis.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/praxis/            # Config directory
/// └── config.toml              # Application configuration
///
/// ~/.local/share/praxis/       # Data directory
/// ├── sessions/                # Session documents
/// ├── users/                   # User documents (completion records)
/// ├── courses/                 # Course documents
/// ├── settings/                # Provider settings document
/// └── offline_queue.json       # Durable offline queue slot
/// ```
pub struct PraxisPaths;

impl PraxisPaths {
    /// Returns the praxis configuration directory (e.g. `~/.config/praxis`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("praxis"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the default config file path.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the praxis data directory (e.g. `~/.local/share/praxis`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join("praxis"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path of the durable offline-queue slot.
    pub fn queue_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("offline_queue.json"))
    }
}
