//! End-to-end flows over the real filesystem adapters.
//!
//! Only the remote provider is scripted; sessions, users, courses, settings
//! and the queue slot all go through the infrastructure implementations, so
//! these tests cover the same wiring the application shell uses.

use async_trait::async_trait;
use praxis_application::{OfflineQueue, PracticeService, SessionService, SettingsResolver};
use praxis_core::clock::ManualClock;
use praxis_core::course::Course;
use praxis_core::error::PraxisError;
use praxis_core::provider::{ConversationCreated, ConversationProvider, ConversationRequest};
use praxis_core::retry::RetryPolicy;
use praxis_core::session::{ClientInfo, CompletionInput, SessionRepository, SessionStatus};
use praxis_core::settings::ProviderSettings;
use praxis_core::user::UserRepository;
use praxis_infrastructure::{
    FileQueueStorage, JsonCourseRepository, JsonDocumentStore, JsonSessionRepository,
    JsonSettingsRepository, JsonUserRepository, WatchConnectivity,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Provider scripted with a fixed number of transient failures.
struct ScriptedProvider {
    calls: AtomicU32,
    failures_before_success: u32,
}

impl ScriptedProvider {
    fn new(failures_before_success: u32) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            failures_before_success,
        })
    }
}

#[async_trait]
impl ConversationProvider for ScriptedProvider {
    async fn create_conversation(
        &self,
        _api_key: &str,
        _request: &ConversationRequest,
    ) -> praxis_core::Result<ConversationCreated> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures_before_success {
            return Err(PraxisError::api(503, "service unavailable"));
        }
        Ok(ConversationCreated {
            conversation_id: "conv-1".to_string(),
            conversation_url: "https://provider.example/conv-1".to_string(),
            status: "active".to_string(),
        })
    }

    async fn end_conversation(
        &self,
        _api_key: &str,
        _conversation_id: &str,
    ) -> praxis_core::Result<()> {
        Ok(())
    }

    async fn health(&self, _api_key: &str) -> praxis_core::Result<()> {
        Ok(())
    }
}

struct World {
    service: Arc<PracticeService>,
    connectivity: Arc<WatchConnectivity>,
    users: Arc<JsonUserRepository>,
    sessions: Arc<JsonSessionRepository>,
    _data_dir: TempDir,
}

async fn world(online: bool, provider: Arc<ScriptedProvider>) -> World {
    let data_dir = TempDir::new().unwrap();
    let store = JsonDocumentStore::new(data_dir.path()).await.unwrap();

    // Seed what the admin panel would have written.
    let courses = Arc::new(JsonCourseRepository::new(store.clone()));
    courses
        .save(&Course {
            id: "course-1".to_string(),
            title: "Spanish for Travelers".to_string(),
            description: "Everyday phrases for your next trip.".to_string(),
            ai_context: None,
            practice_context: None,
        })
        .await
        .unwrap();
    let settings = Arc::new(JsonSettingsRepository::new(store.clone()));
    settings
        .save(&ProviderSettings {
            replica_id: "r-1".to_string(),
            persona_id: "p-1".to_string(),
            api_key: "key-1".to_string(),
            enabled: true,
        })
        .await
        .unwrap();

    let sessions = Arc::new(JsonSessionRepository::new(store.clone()));
    let users = Arc::new(JsonUserRepository::new(store.clone()));
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let connectivity = Arc::new(WatchConnectivity::new(online));

    let resolver = Arc::new(SettingsResolver::new(settings, courses));
    let session_service = Arc::new(
        SessionService::new(
            sessions.clone(),
            users.clone(),
            resolver,
            provider,
            clock.clone(),
            "https://learn.example.com",
        )
        .with_retry_policy(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }),
    );

    let queue = Arc::new(
        OfflineQueue::load(
            Arc::new(FileQueueStorage::new(data_dir.path().join("offline_queue.json"))),
            connectivity.clone(),
            clock,
        )
        .await,
    );

    World {
        service: Arc::new(PracticeService::new(
            session_service,
            queue,
            connectivity.clone(),
        )),
        connectivity,
        users,
        sessions,
        _data_dir: data_dir,
    }
}

fn stored_session_ids(data_dir: &Path) -> Vec<String> {
    let sessions_dir = data_dir.join("sessions");
    if !sessions_dir.exists() {
        return Vec::new();
    }
    std::fs::read_dir(sessions_dir)
        .unwrap()
        .map(|entry| {
            entry
                .unwrap()
                .path()
                .file_stem()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

#[tokio::test]
async fn test_offline_begin_survives_restart_and_replays() {
    let world = world(false, ScriptedProvider::new(0)).await;
    let data_dir = world._data_dir.path().to_path_buf();

    let outcome = world
        .service
        .begin_practice("user-1", "course-1", None, ClientInfo::default())
        .await
        .unwrap();
    assert!(outcome.is_deferred());
    assert!(stored_session_ids(&data_dir).is_empty());

    // A fresh queue over the same slot simulates an app restart.
    let restarted = OfflineQueue::load(
        Arc::new(FileQueueStorage::new(data_dir.join("offline_queue.json"))),
        world.connectivity.clone(),
        Arc::new(ManualClock::new(chrono::Utc::now())),
    )
    .await;
    assert_eq!(restarted.status().await.size, 1);

    // Back online the drain replays the start through the session service.
    world.connectivity.set_online(true);
    assert_eq!(world.service.drain_queue().await, 1);
    assert_eq!(world.service.queue_status().await.size, 0);

    let ids = stored_session_ids(&data_dir);
    assert_eq!(ids.len(), 1);
    let session = world.sessions.find_by_id(&ids[0]).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Confirmed);
    assert_eq!(session.user_id, "user-1");
}

#[tokio::test]
async fn test_full_practice_flow_with_transient_provider_failures() {
    // Two 503s get eaten by the retry engine; the third attempt lands.
    let world = world(true, ScriptedProvider::new(2)).await;

    let session_id = world
        .service
        .begin_practice("user-1", "course-1", Some(600), ClientInfo::default())
        .await
        .unwrap()
        .completed()
        .unwrap();

    let created = world
        .service
        .request_conversation("course-1", "user-1", &session_id)
        .await
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(created.conversation_id, "conv-1");

    let session = world
        .sessions
        .find_by_id(&session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.conversation_id.as_deref(), Some("conv-1"));
    assert!(
        session
            .metadata
            .callback_url
            .unwrap()
            .starts_with("https://learn.example.com/api/tavus/callback/user-1/")
    );

    world
        .service
        .finish_conversation("conv-1")
        .await
        .unwrap()
        .completed()
        .unwrap();

    let outcome = world
        .service
        .record_completion(
            &session_id,
            CompletionInput {
                accuracy_score: Some(150.0),
                duration_seconds: Some(120),
                conversation_id: None,
            },
        )
        .await
        .unwrap();
    assert!(!outcome.is_deferred());

    let session = world
        .sessions
        .find_by_id(&session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.accuracy_score, Some(100.0));

    let record = world
        .users
        .completion("user-1", "course-1")
        .await
        .unwrap()
        .unwrap();
    assert!(record.completed);
    assert_eq!(record.accuracy_score, Some(100.0));
    assert_eq!(record.conversation_id.as_deref(), Some("conv-1"));
}

#[tokio::test]
async fn test_unreachable_provider_defers_conversation_request() {
    let world = world(true, ScriptedProvider::new(u32::MAX)).await;

    let session_id = world
        .service
        .begin_practice("user-1", "course-1", Some(600), ClientInfo::default())
        .await
        .unwrap()
        .completed()
        .unwrap();

    let outcome = world
        .service
        .request_conversation("course-1", "user-1", &session_id)
        .await
        .unwrap();
    assert!(outcome.is_deferred());
    assert_eq!(world.service.queue_status().await.size, 1);

    // The failure is recorded on the session even though it was deferred.
    let session = world
        .sessions
        .find_by_id(&session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
    assert!(session.metadata.last_error.is_some());
}
