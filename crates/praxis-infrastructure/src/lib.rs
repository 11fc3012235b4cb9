pub mod config;
pub mod connectivity;
pub mod course_repository;
pub mod json_store;
pub mod paths;
pub mod queue_storage;
pub mod session_repository;
pub mod settings_repository;
pub mod user_repository;

pub use crate::config::AppConfig;
pub use crate::connectivity::WatchConnectivity;
pub use crate::course_repository::JsonCourseRepository;
pub use crate::json_store::JsonDocumentStore;
pub use crate::queue_storage::FileQueueStorage;
pub use crate::session_repository::JsonSessionRepository;
pub use crate::settings_repository::JsonSettingsRepository;
pub use crate::user_repository::JsonUserRepository;
