//! Volunteer signup model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::{EffectiveStatus, EventId, SignupId, UserId};

pub const DEFAULT_ROLE: &str = "General Help";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "signup_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SignupStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl SignupStatus {
    /// Only pending signups move, and only forward to a decision
    pub fn can_transition_to(self, next: SignupStatus) -> bool {
        matches!(
            (self, next),
            (SignupStatus::Pending, SignupStatus::Approved) | (SignupStatus::Pending, SignupStatus::Rejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, SignupStatus::Pending)
    }
}

impl fmt::Display for SignupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignupStatus::Pending => write!(f, "pending"),
            SignupStatus::Approved => write!(f, "approved"),
            SignupStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Which signups hold a seat against `max_volunteers`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Pending signups reserve a seat until they are rejected
    #[default]
    ApprovedAndPending,
    /// Only approved signups count; approval itself is capacity-checked
    ApprovedOnly,
}

impl CapacityPolicy {
    pub fn holds_seat(self, status: SignupStatus) -> bool {
        match (self, status) {
            (_, SignupStatus::Approved) => true,
            (CapacityPolicy::ApprovedAndPending, SignupStatus::Pending) => true,
            _ => false,
        }
    }

    pub fn counts_pending(self) -> bool {
        matches!(self, CapacityPolicy::ApprovedAndPending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VolunteerSignup {
    pub id: SignupId,
    pub event_id: EventId,
    pub volunteer_id: UserId,
    pub role: String,
    pub skills: Vec<String>,
    pub available_hours: Option<String>,
    pub special_needs: Option<String>,
    pub notes: Option<String>,
    pub hours_contributed: f64,
    pub feedback: Option<String>,
    pub status: SignupStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Volunteer-supplied details accompanying a signup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupDetails {
    pub role: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub available_hours: Option<String>,
    pub special_needs: Option<String>,
    pub notes: Option<String>,
}

/// Normalized signup row handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct NewSignup {
    pub event_id: EventId,
    pub volunteer_id: UserId,
    pub role: String,
    pub skills: Vec<String>,
    pub available_hours: Option<String>,
    pub special_needs: Option<String>,
    pub notes: Option<String>,
    pub status: SignupStatus,
}

/// Status decision requested by an organizer
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: SignupStatus,
    pub feedback: Option<String>,
}

/// A signup joined with the event it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolunteerHistoryEntry {
    pub signup: VolunteerSignup,
    pub event_title: String,
    pub event_location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub event_status: EffectiveStatus,
}
