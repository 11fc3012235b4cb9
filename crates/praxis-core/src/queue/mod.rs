//! Offline-queue domain: item model, payloads and storage trait.

pub mod model;
pub mod storage;

pub use model::{
    CreateConversationPayload, EndConversationPayload, QueueItem, QueueOperation, QueueStatus,
    StartSessionPayload, UpdateCompletionPayload,
};
pub use storage::QueueStorage;
