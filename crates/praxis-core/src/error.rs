//! Error types for the Praxis core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the practice-session core.
///
/// Every variant carries a fixed retryability classification (see
/// [`PraxisError::retryable`]): transient transport failures may be retried
/// with the same request, everything else must be surfaced or reconfigured.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PraxisError {
    /// Connection-level failure (DNS, refused connection, dropped socket).
    #[error("Network error: {message}")]
    Network { message: String },

    /// A remote call exceeded its deadline.
    #[error("Timed out: {message}")]
    Timeout { message: String },

    /// The remote provider answered with a non-success status.
    #[error("Provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Missing or malformed credentials, context, or caller input.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Quota or usage limit reached on the provider account.
    #[error("Usage limit reached: {0}")]
    Limit(String),

    /// Entity not found with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Persistence collaborator failure (repository/storage layer).
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Terminal failure after the retry budget was spent on a retryable error.
    #[error("Retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<PraxisError>,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PraxisError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a Timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates an Api error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Limit error
    pub fn limit(message: impl Into<String>) -> Self {
        Self::Limit(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Classification
    // ============================================================================

    /// Whether a later attempt with the same request may succeed.
    ///
    /// Network failures, timeouts and provider 5xx responses are transient.
    /// `RetriesExhausted` delegates to the wrapped error so offline-aware
    /// callers can still recognize a deferrable failure.
    pub fn retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::RetriesExhausted { last, .. } => last.retryable(),
            _ => false,
        }
    }

    /// Check if this is a Config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a Timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PraxisError {
    fn from(err: std::io::Error) -> Self {
        Self::DataAccess(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for PraxisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error as produced by the repository layer.
impl From<anyhow::Error> for PraxisError {
    fn from(err: anyhow::Error) -> Self {
        Self::DataAccess(format!("{err:#}"))
    }
}

/// A type alias for `Result<T, PraxisError>`.
pub type Result<T> = std::result::Result<T, PraxisError>;
