//! Test context for unified test setup
//!
//! Builds the full service stack over each available backend, with a
//! recording notifier so tests can assert on side effects.

use std::sync::Arc;
use std::time::Duration;

use voloconnect::database::DatabaseService;
use voloconnect::models::CapacityPolicy;
use voloconnect::services::{Notification, NotificationService, RecordingNotifier, ServiceFactory};

use super::database_helper::{init_test_logging, TestDatabase};

/// Services over one backend
pub struct TestContext {
    pub backend: &'static str,
    pub services: ServiceFactory,
    pub recorder: RecordingNotifier,
    pub database: Option<TestDatabase>,
}

impl TestContext {
    pub fn in_memory(policy: CapacityPolicy) -> Self {
        init_test_logging();
        Self::build("memory", DatabaseService::in_memory(policy), None)
    }

    pub async fn postgres(policy: CapacityPolicy) -> Option<Self> {
        let database = TestDatabase::connect().await?;
        let db = DatabaseService::postgres(database.pool.clone(), policy);
        Some(Self::build("postgres", db, Some(database)))
    }

    /// The in-memory context, plus PostgreSQL when one is configured
    pub async fn all(policy: CapacityPolicy) -> Vec<Self> {
        let mut contexts = vec![Self::in_memory(policy)];
        if let Some(postgres) = Self::postgres(policy).await {
            contexts.push(postgres);
        }
        contexts
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.recorder.sent()
    }

    fn build(backend: &'static str, db: DatabaseService, database: Option<TestDatabase>) -> Self {
        let recorder = RecordingNotifier::new();
        let notifications = NotificationService::new(Arc::new(recorder.clone()), Duration::from_secs(1));
        Self {
            backend,
            services: ServiceFactory::with_notifications(db, notifications),
            recorder,
            database,
        }
    }
}
