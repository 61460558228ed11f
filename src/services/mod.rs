//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod event;
pub mod ledger;
pub mod notification;
pub mod query;
pub mod stats;

// Re-export commonly used services
pub use auth::{AuthContext, Permission};
pub use event::EventRegistry;
pub use ledger::VolunteerLedger;
pub use notification::{
    LogNotifier, Notification, NotificationService, NotificationStats, Notifier, RecordingNotifier,
    WebhookNotifier,
};
pub use query::QueryService;
pub use stats::StatsAggregator;

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub events: EventRegistry,
    pub ledger: VolunteerLedger,
    pub queries: QueryService,
    pub stats: StatsAggregator,
    pub notifications: NotificationService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService, settings: &Settings) -> Result<Self> {
        let notifications = NotificationService::from_config(&settings.notifications)?;
        Ok(Self::with_notifications(db, notifications))
    }

    /// Wire the services around an existing notification service
    pub fn with_notifications(db: DatabaseService, notifications: NotificationService) -> Self {
        Self {
            events: EventRegistry::new(db.clone(), notifications.clone()),
            ledger: VolunteerLedger::new(db.clone(), notifications.clone()),
            queries: QueryService::new(db.clone(), notifications.clone()),
            stats: StatsAggregator::new(db),
            notifications,
        }
    }
}
