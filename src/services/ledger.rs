//! Volunteer participation ledger
//!
//! Owns signups and everything hanging off them: the approval decision,
//! contributed hours and organizer feedback. Seat accounting lives in the
//! repository so the duplicate check, capacity check and insert share one
//! critical section.

use futures::future::try_join_all;
use tracing::debug;

use super::auth::require_organizer;
use super::notification::{Notification, NotificationService};
use crate::database::DatabaseService;
use crate::models::*;
use crate::utils::errors::{Result, ValidationErrors, VoloConnectError};
use crate::utils::helpers::{check_max_length, check_text_length, non_blank, normalize_skills, normalize_whitespace};
use crate::utils::logging::log_signup_action;

pub const ROLE_MAX: usize = 100;
pub const AVAILABLE_HOURS_MAX: usize = 200;
pub const SPECIAL_NEEDS_MAX: usize = 500;
pub const NOTES_MAX: usize = 1000;
pub const FEEDBACK_MAX: usize = 1000;

#[derive(Debug, Clone)]
pub struct VolunteerLedger {
    db: DatabaseService,
    notifications: NotificationService,
}

impl VolunteerLedger {
    pub fn new(db: DatabaseService, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Sign `volunteer_id` up for an event. The organizer signing up for
    /// their own event is approved immediately; everyone else starts pending.
    pub async fn sign_up(
        &self,
        volunteer_id: UserId,
        event_id: EventId,
        details: SignupDetails,
    ) -> Result<VolunteerSignup> {
        debug!(volunteer_id = volunteer_id, event_id = event_id, "Signing up volunteer");

        let event = self.find_event(event_id).await?;

        let mut errors = ValidationErrors::new();
        check_max_length(&mut errors, "role", "Role", details.role.as_deref(), ROLE_MAX);
        check_max_length(
            &mut errors,
            "available_hours",
            "Available hours",
            details.available_hours.as_deref(),
            AVAILABLE_HOURS_MAX,
        );
        check_max_length(
            &mut errors,
            "special_needs",
            "Special needs",
            details.special_needs.as_deref(),
            SPECIAL_NEEDS_MAX,
        );
        check_max_length(&mut errors, "notes", "Notes", details.notes.as_deref(), NOTES_MAX);
        errors.into_result()?;

        let status = if event.is_organizer(volunteer_id) {
            SignupStatus::Approved
        } else {
            SignupStatus::Pending
        };

        let signup = self
            .db
            .signups
            .create_reserving_seat(NewSignup {
                event_id,
                volunteer_id,
                role: normalize_role(details.role),
                skills: normalize_skills(&details.skills),
                available_hours: non_blank(details.available_hours),
                special_needs: non_blank(details.special_needs),
                notes: non_blank(details.notes),
                status,
            })
            .await?;

        log_signup_action(signup.id, event_id, "sign_up", volunteer_id, &signup.status.to_string());

        if !event.is_organizer(volunteer_id) {
            self.notifications
                .send(Notification::signup_received(&event, &signup))
                .await;
        }

        Ok(signup)
    }

    /// Record the organizer's decision on a pending signup
    pub async fn set_status(
        &self,
        requester_id: UserId,
        event_id: EventId,
        signup_id: SignupId,
        status: SignupStatus,
    ) -> Result<VolunteerSignup> {
        self.decide(requester_id, event_id, signup_id, StatusChange { status, feedback: None })
            .await
    }

    pub async fn approve(&self, requester_id: UserId, event_id: EventId, signup_id: SignupId) -> Result<VolunteerSignup> {
        self.set_status(requester_id, event_id, signup_id, SignupStatus::Approved)
            .await
    }

    /// Reject a pending signup, optionally telling the volunteer why
    pub async fn reject(
        &self,
        requester_id: UserId,
        event_id: EventId,
        signup_id: SignupId,
        feedback: Option<String>,
    ) -> Result<VolunteerSignup> {
        let change = StatusChange {
            status: SignupStatus::Rejected,
            feedback,
        };
        self.decide(requester_id, event_id, signup_id, change).await
    }

    pub async fn decide(
        &self,
        requester_id: UserId,
        event_id: EventId,
        signup_id: SignupId,
        change: StatusChange,
    ) -> Result<VolunteerSignup> {
        let event = self.find_event(event_id).await?;
        require_organizer(&event, requester_id, "change signup status")?;

        let signup = self.find_signup(signup_id).await?;
        if signup.event_id != event_id {
            return Err(VoloConnectError::not_found("signup", signup_id));
        }

        let feedback = match change.feedback {
            Some(feedback) => Some(validate_feedback(&feedback)?),
            None => None,
        };

        let updated = self
            .db
            .signups
            .transition_status(
                signup_id,
                StatusChange {
                    status: change.status,
                    feedback,
                },
            )
            .await?;

        log_signup_action(signup_id, event_id, "set_status", requester_id, &updated.status.to_string());
        self.notifications
            .send(Notification::status_changed(&event, &updated))
            .await;

        Ok(updated)
    }

    /// Record hours contributed on an approved signup
    pub async fn update_hours(&self, requester_id: UserId, signup_id: SignupId, hours: f64) -> Result<VolunteerSignup> {
        let signup = self.find_signup(signup_id).await?;
        let event = self.find_event(signup.event_id).await?;
        require_organizer(&event, requester_id, "update hours")?;

        if !hours.is_finite() || hours < 0.0 {
            return Err(VoloConnectError::invalid_field(
                "hours_contributed",
                "Hours must be a non-negative number",
            ));
        }
        if signup.status != SignupStatus::Approved {
            return Err(VoloConnectError::invalid_transition(signup.status, "hours recorded"));
        }

        let updated = self.db.signups.update_hours(signup_id, hours).await?;
        log_signup_action(signup_id, signup.event_id, "update_hours", requester_id, &updated.status.to_string());
        Ok(updated)
    }

    pub async fn record_feedback(
        &self,
        requester_id: UserId,
        signup_id: SignupId,
        feedback: String,
    ) -> Result<VolunteerSignup> {
        let signup = self.find_signup(signup_id).await?;
        let event = self.find_event(signup.event_id).await?;
        require_organizer(&event, requester_id, "record feedback")?;

        let feedback = validate_feedback(&feedback)?;
        let updated = self.db.signups.update_feedback(signup_id, feedback).await?;
        log_signup_action(signup_id, signup.event_id, "record_feedback", requester_id, &updated.status.to_string());
        Ok(updated)
    }

    /// Reassign the role a volunteer fills at an event. A blank role falls
    /// back to the default, as at signup.
    pub async fn update_role(
        &self,
        requester_id: UserId,
        event_id: EventId,
        volunteer_id: UserId,
        role: String,
    ) -> Result<VolunteerSignup> {
        let event = self.find_event(event_id).await?;
        require_organizer(&event, requester_id, "update role")?;

        let mut errors = ValidationErrors::new();
        check_max_length(&mut errors, "role", "Role", Some(&role), ROLE_MAX);
        errors.into_result()?;

        let updated = self
            .db
            .signups
            .update_role(event_id, volunteer_id, normalize_role(Some(role)))
            .await?
            .ok_or_else(|| VoloConnectError::not_found("volunteer signup", volunteer_id))?;

        log_signup_action(updated.id, event_id, "update_role", requester_id, &updated.status.to_string());
        Ok(updated)
    }

    pub async fn list_for_event(&self, event_id: EventId) -> Result<Vec<VolunteerSignup>> {
        self.db.signups.list_for_event(event_id).await
    }

    pub async fn list_for_volunteer(&self, volunteer_id: UserId) -> Result<Vec<VolunteerSignup>> {
        self.db.signups.list_for_volunteer(volunteer_id).await
    }

    /// A volunteer's signups joined with the events they belong to
    pub async fn volunteer_history(&self, volunteer_id: UserId) -> Result<Vec<VolunteerHistoryEntry>> {
        let signups = self.db.signups.list_for_volunteer(volunteer_id).await?;
        let events = try_join_all(signups.iter().map(|s| self.find_event(s.event_id))).await?;

        Ok(signups
            .into_iter()
            .zip(events)
            .map(|(signup, event)| VolunteerHistoryEntry {
                event_status: event.effective_status(),
                event_title: event.title,
                event_location: event.location,
                start_date: event.start_date,
                end_date: event.end_date,
                signup,
            })
            .collect())
    }

    /// Remove a volunteer from an event, freeing the seat they held
    pub async fn remove_signup(&self, requester_id: UserId, event_id: EventId, volunteer_id: UserId) -> Result<()> {
        let event = self.find_event(event_id).await?;
        require_organizer(&event, requester_id, "remove signup")?;

        let signup = self
            .db
            .signups
            .find_by_pair(event_id, volunteer_id)
            .await?
            .ok_or_else(|| VoloConnectError::not_found("volunteer signup", volunteer_id))?;

        if !self.db.signups.delete(event_id, volunteer_id).await? {
            return Err(VoloConnectError::not_found("volunteer signup", volunteer_id));
        }

        log_signup_action(signup.id, event_id, "remove", requester_id, &signup.status.to_string());
        Ok(())
    }

    async fn find_event(&self, event_id: EventId) -> Result<Event> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| VoloConnectError::not_found("event", event_id))
    }

    async fn find_signup(&self, signup_id: SignupId) -> Result<VolunteerSignup> {
        self.db
            .signups
            .find_by_id(signup_id)
            .await?
            .ok_or_else(|| VoloConnectError::not_found("signup", signup_id))
    }
}

fn normalize_role(role: Option<String>) -> String {
    non_blank(role)
        .map(|r| normalize_whitespace(&r))
        .unwrap_or_else(|| DEFAULT_ROLE.to_string())
}

fn validate_feedback(feedback: &str) -> Result<String> {
    let mut errors = ValidationErrors::new();
    check_text_length(&mut errors, "feedback", "Feedback", feedback, 1, FEEDBACK_MAX);
    errors.into_result()?;
    Ok(feedback.trim().to_string())
}
