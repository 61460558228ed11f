//! Event registry
//!
//! Creation, editing and the organizer-driven status lifecycle of events.
//! The `full` status is never written; it is derived from the seat count
//! whenever an event is read.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::auth::require_organizer;
use super::notification::{Notification, NotificationService};
use crate::database::DatabaseService;
use crate::models::*;
use crate::utils::errors::{Result, ValidationErrors, VoloConnectError};
use crate::utils::helpers::{check_text_length, is_future, normalize_skills, normalize_whitespace};
use crate::utils::logging::log_event_action;

pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MIN: usize = 20;
pub const DESCRIPTION_MAX: usize = 1000;
pub const LOCATION_MIN: usize = 5;
pub const LOCATION_MAX: usize = 200;
pub const MAX_VOLUNTEERS_LIMIT: i32 = 1000;

#[derive(Debug, Clone)]
pub struct EventRegistry {
    db: DatabaseService,
    notifications: NotificationService,
}

impl EventRegistry {
    pub fn new(db: DatabaseService, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Create an event owned by `organizer_id`, reporting every invalid field at once
    pub async fn create_event(&self, organizer_id: UserId, request: CreateEventRequest) -> Result<Event> {
        debug!(organizer_id = organizer_id, "Creating event");

        let now = Utc::now();
        let mut errors = ValidationErrors::new();
        check_text_length(&mut errors, "title", "Title", &request.title, TITLE_MIN, TITLE_MAX);
        check_text_length(
            &mut errors,
            "description",
            "Description",
            &request.description,
            DESCRIPTION_MIN,
            DESCRIPTION_MAX,
        );
        check_text_length(&mut errors, "location", "Location", &request.location, LOCATION_MIN, LOCATION_MAX);
        if !is_future(request.start_date, now) {
            errors.add("start_date", "Start date must be in the future");
        }
        check_date_order(&mut errors, request.start_date, request.end_date);
        check_max_volunteers(&mut errors, request.max_volunteers);
        errors.into_result()?;

        let event = self
            .db
            .events
            .create(NewEvent {
                title: normalize_whitespace(&request.title),
                description: request.description.trim().to_string(),
                location: normalize_whitespace(&request.location),
                start_date: request.start_date,
                end_date: request.end_date,
                max_volunteers: request.max_volunteers,
                organizer_id,
                required_skills: normalize_skills(&request.required_skills),
            })
            .await?;

        log_event_action(event.id, "create", organizer_id, Some(&event.title));
        Ok(event)
    }

    /// Apply a partial update. Only the organizer may edit; changed fields
    /// follow the creation rules and a status change follows the lifecycle.
    pub async fn update_event(
        &self,
        requester_id: UserId,
        event_id: EventId,
        request: UpdateEventRequest,
    ) -> Result<Event> {
        let event = self.get_event(event_id).await?;
        require_organizer(&event, requester_id, "update event")?;

        if request.is_empty() {
            return Ok(event);
        }

        let changes = merge_changes(&event, request, Utc::now())?;
        let cancelled = changes.status == EventStatus::Cancelled && event.status != EventStatus::Cancelled;
        let status_changed = changes.status != event.status;

        let updated = match self.db.events.update(event_id, event.status, changes).await? {
            Some(updated) => updated,
            None => {
                warn!(event_id = event_id, "Event status changed during update");
                return Err(VoloConnectError::Conflict(format!(
                    "event {} was modified concurrently",
                    event_id
                )));
            }
        };

        if status_changed {
            log_event_action(event_id, "status", requester_id, Some(&updated.status.to_string()));
        } else {
            log_event_action(event_id, "update", requester_id, None);
        }

        if cancelled {
            self.notify_cancellation(&updated).await;
        }

        Ok(updated)
    }

    pub async fn cancel_event(&self, requester_id: UserId, event_id: EventId) -> Result<Event> {
        self.set_status(requester_id, event_id, EventStatus::Cancelled).await
    }

    pub async fn complete_event(&self, requester_id: UserId, event_id: EventId) -> Result<Event> {
        self.set_status(requester_id, event_id, EventStatus::Completed).await
    }

    pub async fn get_event(&self, event_id: EventId) -> Result<Event> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| VoloConnectError::not_found("event", event_id))
    }

    /// Events in creation order, narrowed by every field set on `filter`
    pub async fn list_events(&self, filter: EventFilter) -> Result<Vec<Event>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty());

        let events = self.db.events.list(search, filter.organizer_id).await?;

        Ok(match filter.status {
            Some(status) => events
                .into_iter()
                .filter(|e| e.effective_status() == status)
                .collect(),
            None => events,
        })
    }

    async fn set_status(&self, requester_id: UserId, event_id: EventId, status: EventStatus) -> Result<Event> {
        let request = UpdateEventRequest {
            status: Some(status),
            ..Default::default()
        };
        self.update_event(requester_id, event_id, request).await
    }

    /// Tell everyone holding a seat. The cancellation is already stored, so a
    /// failure here is logged and never returned.
    async fn notify_cancellation(&self, event: &Event) {
        let signups = match self.db.signups.list_for_event(event.id).await {
            Ok(signups) => signups,
            Err(e) => {
                warn!(event_id = event.id, error = %e, "Failed to list volunteers for cancellation notice");
                return;
            }
        };
        let notifications: Vec<Notification> = signups
            .iter()
            .filter(|s| s.status != SignupStatus::Rejected)
            .map(|s| Notification::event_cancelled(event, s.volunteer_id))
            .collect();

        info!(event_id = event.id, recipients = notifications.len(), "Event cancelled");
        self.notifications.send_all(notifications).await;
    }
}

fn check_date_order(errors: &mut ValidationErrors, start_date: DateTime<Utc>, end_date: DateTime<Utc>) {
    if end_date <= start_date {
        errors.add("end_date", "End date must be after start date");
    }
}

fn check_max_volunteers(errors: &mut ValidationErrors, max_volunteers: i32) {
    if !(1..=MAX_VOLUNTEERS_LIMIT).contains(&max_volunteers) {
        errors.add(
            "max_volunteers",
            format!("Maximum volunteers must be between 1 and {}", MAX_VOLUNTEERS_LIMIT),
        );
    }
}

/// Overlay `request` on `event`, validating only what changes
fn merge_changes(event: &Event, request: UpdateEventRequest, now: DateTime<Utc>) -> Result<EventChanges> {
    let mut errors = ValidationErrors::new();

    if let Some(title) = &request.title {
        check_text_length(&mut errors, "title", "Title", title, TITLE_MIN, TITLE_MAX);
    }
    if let Some(description) = &request.description {
        check_text_length(
            &mut errors,
            "description",
            "Description",
            description,
            DESCRIPTION_MIN,
            DESCRIPTION_MAX,
        );
    }
    if let Some(location) = &request.location {
        check_text_length(&mut errors, "location", "Location", location, LOCATION_MIN, LOCATION_MAX);
    }
    if let Some(start_date) = request.start_date {
        if start_date != event.start_date && !is_future(start_date, now) {
            errors.add("start_date", "Start date must be in the future");
        }
    }
    if let Some(max_volunteers) = request.max_volunteers {
        check_max_volunteers(&mut errors, max_volunteers);
    }

    let start_date = request.start_date.unwrap_or(event.start_date);
    let end_date = request.end_date.unwrap_or(event.end_date);
    if request.start_date.is_some() || request.end_date.is_some() {
        check_date_order(&mut errors, start_date, end_date);
    }
    errors.into_result()?;

    let status = match request.status {
        Some(next) if next != event.status => {
            if !event.status.can_transition_to(next) {
                return Err(VoloConnectError::invalid_transition(event.status, next));
            }
            next
        }
        _ => event.status,
    };

    Ok(EventChanges {
        title: request
            .title
            .map(|t| normalize_whitespace(&t))
            .unwrap_or_else(|| event.title.clone()),
        description: request
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or_else(|| event.description.clone()),
        location: request
            .location
            .map(|l| normalize_whitespace(&l))
            .unwrap_or_else(|| event.location.clone()),
        start_date,
        end_date,
        max_volunteers: request.max_volunteers.unwrap_or(event.max_volunteers),
        status,
        required_skills: request
            .required_skills
            .map(normalize_skills)
            .unwrap_or_else(|| event.required_skills.clone()),
    })
}
