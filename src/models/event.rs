//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::{EventId, UserId};

/// Stored event status, set by the organizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl EventStatus {
    /// Whether the organizer may move an event from `self` to `next`
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (EventStatus::Active, EventStatus::Completed) | (EventStatus::Active, EventStatus::Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, EventStatus::Active)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStatus::Active => write!(f, "active"),
            EventStatus::Completed => write!(f, "completed"),
            EventStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Read-time status: `Full` is derived from the seat count, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    Active,
    Full,
    Completed,
    Cancelled,
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectiveStatus::Active => write!(f, "active"),
            EffectiveStatus::Full => write!(f, "full"),
            EffectiveStatus::Completed => write!(f, "completed"),
            EffectiveStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_volunteers: i32,
    /// Seats taken under the store's capacity policy, computed on read
    pub current_volunteers: i64,
    pub status: EventStatus,
    pub organizer_id: UserId,
    pub required_skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_organizer(&self, user_id: UserId) -> bool {
        self.organizer_id == user_id
    }

    pub fn is_full(&self) -> bool {
        self.current_volunteers >= i64::from(self.max_volunteers)
    }

    pub fn effective_status(&self) -> EffectiveStatus {
        match self.status {
            EventStatus::Active if self.is_full() => EffectiveStatus::Full,
            EventStatus::Active => EffectiveStatus::Active,
            EventStatus::Completed => EffectiveStatus::Completed,
            EventStatus::Cancelled => EffectiveStatus::Cancelled,
        }
    }

    pub fn remaining_seats(&self) -> i64 {
        (i64::from(self.max_volunteers) - self.current_volunteers).max(0)
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_date <= now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_volunteers: i32,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub max_volunteers: Option<i32>,
    pub status: Option<EventStatus>,
    pub required_skills: Option<Vec<String>>,
}

impl UpdateEventRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.max_volunteers.is_none()
            && self.status.is_none()
            && self.required_skills.is_none()
    }
}

/// Fully validated event fields handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_volunteers: i32,
    pub organizer_id: UserId,
    pub required_skills: Vec<String>,
}

/// Complete replacement of the organizer-editable fields
#[derive(Debug, Clone, PartialEq)]
pub struct EventChanges {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_volunteers: i32,
    pub status: EventStatus,
    pub required_skills: Vec<String>,
}

/// Listing filter; every field narrows the result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub status: Option<EffectiveStatus>,
    pub search: Option<String>,
    pub organizer_id: Option<UserId>,
}

impl EventFilter {
    pub fn with_status(status: EffectiveStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Default::default()
        }
    }

    pub fn for_organizer(organizer_id: UserId) -> Self {
        Self {
            organizer_id: Some(organizer_id),
            ..Default::default()
        }
    }
}
