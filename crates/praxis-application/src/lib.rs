pub mod gateway;
pub mod offline_queue;
pub mod practice_service;
pub mod resolver;
pub mod session_service;

pub use crate::gateway::{Dispatch, OfflineGateway};
pub use crate::offline_queue::{OfflineQueue, QueueDispatcher};
pub use crate::practice_service::PracticeService;
pub use crate::resolver::SettingsResolver;
pub use crate::session_service::SessionService;
