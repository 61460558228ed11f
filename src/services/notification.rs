//! Notification service implementation
//!
//! Best-effort delivery of the side effects that follow a state change:
//! new signups reach the organizer, decisions and Q&A answers reach the
//! volunteer, and cancellations reach everyone holding a seat. Delivery runs
//! inline with a timeout; failures are counted and logged, never returned.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::NotificationConfig;
use crate::models::{Event, EventId, Query, QueryId, SignupId, SignupStatus, UserId, VolunteerSignup};
use crate::utils::errors::Result;

/// A message addressed to a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    SignupReceived {
        organizer_id: UserId,
        event_id: EventId,
        event_title: String,
        signup_id: SignupId,
        volunteer_id: UserId,
    },
    SignupStatusChanged {
        volunteer_id: UserId,
        event_id: EventId,
        event_title: String,
        signup_id: SignupId,
        status: SignupStatus,
        feedback: Option<String>,
    },
    QueryResponded {
        author_id: UserId,
        event_id: EventId,
        event_title: String,
        query_id: QueryId,
    },
    EventCancelled {
        volunteer_id: UserId,
        event_id: EventId,
        event_title: String,
    },
}

impl Notification {
    pub fn signup_received(event: &Event, signup: &VolunteerSignup) -> Self {
        Notification::SignupReceived {
            organizer_id: event.organizer_id,
            event_id: event.id,
            event_title: event.title.clone(),
            signup_id: signup.id,
            volunteer_id: signup.volunteer_id,
        }
    }

    pub fn status_changed(event: &Event, signup: &VolunteerSignup) -> Self {
        Notification::SignupStatusChanged {
            volunteer_id: signup.volunteer_id,
            event_id: event.id,
            event_title: event.title.clone(),
            signup_id: signup.id,
            status: signup.status,
            feedback: signup.feedback.clone(),
        }
    }

    pub fn query_responded(event: &Event, query: &Query) -> Self {
        Notification::QueryResponded {
            author_id: query.author_id,
            event_id: event.id,
            event_title: event.title.clone(),
            query_id: query.id,
        }
    }

    pub fn event_cancelled(event: &Event, volunteer_id: UserId) -> Self {
        Notification::EventCancelled {
            volunteer_id,
            event_id: event.id,
            event_title: event.title.clone(),
        }
    }

    pub fn recipient(&self) -> UserId {
        match self {
            Notification::SignupReceived { organizer_id, .. } => *organizer_id,
            Notification::SignupStatusChanged { volunteer_id, .. } => *volunteer_id,
            Notification::QueryResponded { author_id, .. } => *author_id,
            Notification::EventCancelled { volunteer_id, .. } => *volunteer_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::SignupReceived { .. } => "signup_received",
            Notification::SignupStatusChanged { .. } => "signup_status_changed",
            Notification::QueryResponded { .. } => "query_responded",
            Notification::EventCancelled { .. } => "event_cancelled",
        }
    }

    /// Plain-text body for channels without templating
    pub fn render(&self) -> String {
        match self {
            Notification::SignupReceived { event_title, volunteer_id, .. } => {
                format!("New volunteer signup for \"{}\" from user {}", event_title, volunteer_id)
            }
            Notification::SignupStatusChanged { event_title, status, feedback, .. } => match feedback {
                Some(feedback) => format!(
                    "Your signup for \"{}\" was {}. Feedback: {}",
                    event_title, status, feedback
                ),
                None => format!("Your signup for \"{}\" was {}", event_title, status),
            },
            Notification::QueryResponded { event_title, .. } => {
                format!("The organizer of \"{}\" answered your question", event_title)
            }
            Notification::EventCancelled { event_title, .. } => {
                format!("\"{}\" has been cancelled", event_title)
            }
        }
    }
}

/// Delivery channel for notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Writes notifications to the log only
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        info!(
            recipient_id = notification.recipient(),
            kind = notification.kind(),
            message = %notification.render(),
            "Notification"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    recipient_id: UserId,
    kind: &'a str,
    message: String,
    notification: &'a Notification,
}

/// POSTs each notification as JSON to a configured endpoint
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("VoloConnect/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let payload = WebhookPayload {
            recipient_id: notification.recipient(),
            kind: notification.kind(),
            message: notification.render(),
            notification,
        };

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        debug!(url = %self.url, kind = notification.kind(), "Webhook notification delivered");
        Ok(())
    }
}

/// Delivery counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total_sent: u64,
    pub total_failed: u64,
    pub sent_by_kind: HashMap<String, u64>,
}

/// Front door used by the domain services
#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
    stats: Arc<Mutex<NotificationStats>>,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self {
            notifier,
            timeout,
            stats: Arc::new(Mutex::new(NotificationStats::default())),
        }
    }

    /// Webhook delivery when a URL is configured, log delivery otherwise
    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let notifier: Arc<dyn Notifier> = match &config.webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone(), timeout)?),
            None => Arc::new(LogNotifier),
        };
        Ok(Self::new(notifier, timeout))
    }

    /// Deliver one notification; the outcome only affects the counters.
    ///
    /// Delivery runs inline, so a slow channel adds up to the configured
    /// timeout to the calling operation.
    pub async fn send(&self, notification: Notification) {
        match tokio::time::timeout(self.timeout, self.notifier.notify(&notification)).await {
            Ok(Ok(())) => self.record_success(notification.kind()),
            Ok(Err(e)) => {
                self.record_failure();
                warn!(
                    recipient_id = notification.recipient(),
                    kind = notification.kind(),
                    error = %e,
                    "Failed to deliver notification"
                );
            }
            Err(_) => {
                self.record_failure();
                warn!(
                    recipient_id = notification.recipient(),
                    kind = notification.kind(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Notification delivery timed out"
                );
            }
        }
    }

    pub async fn send_all(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }
        let count = notifications.len();
        futures::future::join_all(notifications.into_iter().map(|n| self.send(n))).await;
        debug!(count = count, "Bulk notifications completed");
    }

    pub fn stats(&self) -> NotificationStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record_success(&self, kind: &str) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.total_sent += 1;
            *stats.sent_by_kind.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    fn record_failure(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.total_failed += 1;
        }
    }
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("timeout", &self.timeout)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Notifier that keeps everything it is handed, for assertions in tests
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::VoloConnectError;

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, _notification: &Notification) -> Result<()> {
            Err(VoloConnectError::Config("channel down".to_string()))
        }
    }

    struct SlowNotifier;

    #[async_trait]
    impl Notifier for SlowNotifier {
        async fn notify(&self, _notification: &Notification) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn cancelled(volunteer_id: UserId) -> Notification {
        Notification::EventCancelled {
            volunteer_id,
            event_id: 3,
            event_title: "Food bank shift".to_string(),
        }
    }

    #[test]
    fn test_render_and_recipient() {
        let notification = Notification::SignupStatusChanged {
            volunteer_id: 9,
            event_id: 1,
            event_title: "Park cleanup".to_string(),
            signup_id: 4,
            status: SignupStatus::Rejected,
            feedback: Some("Roles are filled".to_string()),
        };

        assert_eq!(notification.recipient(), 9);
        assert_eq!(notification.kind(), "signup_status_changed");
        assert_eq!(
            notification.render(),
            "Your signup for \"Park cleanup\" was rejected. Feedback: Roles are filled"
        );
    }

    #[test]
    fn test_serialized_notification_is_tagged() {
        let value = serde_json::to_value(cancelled(2)).unwrap();
        assert_eq!(value["type"], "event_cancelled");
        assert_eq!(value["volunteer_id"], 2);
    }

    #[tokio::test]
    async fn test_stats_update() {
        let recorder = RecordingNotifier::new();
        let service = NotificationService::new(Arc::new(recorder.clone()), Duration::from_secs(1));

        service.send_all(vec![cancelled(1), cancelled(2)]).await;

        let stats = service.stats();
        assert_eq!(stats.total_sent, 2);
        assert_eq!(stats.total_failed, 0);
        assert_eq!(stats.sent_by_kind.get("event_cancelled"), Some(&2));
        assert_eq!(recorder.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let service = NotificationService::new(Arc::new(FailingNotifier), Duration::from_secs(1));

        service.send(cancelled(1)).await;

        assert_eq!(service.stats().total_failed, 1);
        assert_eq!(service.stats().total_sent, 0);
    }

    #[tokio::test]
    async fn test_slow_delivery_times_out() {
        let service = NotificationService::new(Arc::new(SlowNotifier), Duration::from_millis(50));

        service.send(cancelled(1)).await;

        assert_eq!(service.stats().total_failed, 1);
    }

    #[test]
    fn test_from_config_without_webhook_uses_log() {
        let service = NotificationService::from_config(&NotificationConfig::default()).unwrap();
        assert_eq!(service.stats(), NotificationStats::default());
    }
}
