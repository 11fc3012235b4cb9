//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use super::model::PracticeSession;
use anyhow::Result;
use async_trait::async_trait;

/// An abstract repository for practice-session persistence.
///
/// This trait defines the contract for persisting and retrieving sessions,
/// decoupling the core logic from the specific storage mechanism (managed
/// document database, local files, in-memory test doubles).
///
/// Sessions are append-and-update only: there is no delete, a session only
/// ever moves to a terminal status.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(PracticeSession))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<PracticeSession>>;

    /// Saves a session to storage, overwriting any previous revision.
    async fn save(&self, session: &PracticeSession) -> Result<()>;
}
