//! Data models module
//!
//! Plain data structures shared by the repositories and services.

pub mod event;
pub mod signup;
pub mod query;
pub mod stats;

/// Opaque caller identity resolved by the session layer
pub type UserId = i64;
pub type EventId = i64;
pub type SignupId = i64;
pub type QueryId = i64;

// Re-export commonly used models
pub use event::{Event, EventStatus, EffectiveStatus, CreateEventRequest, UpdateEventRequest, NewEvent, EventChanges, EventFilter};
pub use signup::{VolunteerSignup, SignupStatus, CapacityPolicy, SignupDetails, NewSignup, StatusChange, VolunteerHistoryEntry, DEFAULT_ROLE};
pub use query::{Query, QueryStatus, SubmitQueryRequest, NewQuery, ResponseOutcome};
pub use stats::{StatsScope, EventStats, VolunteerStats};
