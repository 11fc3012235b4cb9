//! Session domain: model and persistence trait.

pub mod model;
pub mod repository;

pub use model::{
    ClientInfo, CompletionInput, PracticeSession, SessionMetadata, SessionStatus, SessionUpdate,
};
pub use repository::SessionRepository;
