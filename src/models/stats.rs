//! Derived statistics

use serde::{Deserialize, Serialize};

use super::UserId;

/// Which events a statistics snapshot covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "organizer_id")]
pub enum StatsScope {
    Global,
    Organizer(UserId),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total_events: u64,
    pub active_events: u64,
    pub full_events: u64,
    pub completed_events: u64,
    pub cancelled_events: u64,
    /// Distinct volunteers across approved signups
    pub total_volunteers: u64,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerStats {
    pub volunteer_id: UserId,
    pub total_events: u64,
    pub completed_events: u64,
    pub upcoming_commitments: u64,
    pub total_hours: f64,
    pub roles: Vec<String>,
    pub skills: Vec<String>,
}
