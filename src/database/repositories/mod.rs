//! Database repositories module
//!
//! One repository interface per entity, with PostgreSQL implementations.
//! Guards that must hold under concurrency (pair uniqueness, seat counts,
//! single response) are evaluated inside the repository, next to the write.

pub mod event;
pub mod signup;
pub mod query;

use async_trait::async_trait;

use crate::models::*;
use crate::utils::errors::Result;

// Re-export repositories
pub use event::PgEventRepository;
pub use signup::PgSignupRepository;
pub use query::PgQueryRepository;

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: NewEvent) -> Result<Event>;

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>>;

    /// Replace the editable fields if the stored status still equals
    /// `expected_status`; `None` when the event is missing or moved on
    async fn update(
        &self,
        id: EventId,
        expected_status: EventStatus,
        changes: EventChanges,
    ) -> Result<Option<Event>>;

    /// Events in insertion order, narrowed by a case-insensitive search over
    /// title and description and by organizer
    async fn list(&self, search: Option<&str>, organizer_id: Option<UserId>) -> Result<Vec<Event>>;
}

#[async_trait]
pub trait SignupRepository: Send + Sync {
    /// Insert a signup while holding the event's seat guard.
    ///
    /// Fails with `NotFound` for an unknown event, `State` when the event is
    /// no longer active, `Conflict` when the pair already exists and
    /// `Capacity` when the seats counted by the policy are exhausted.
    async fn create_reserving_seat(&self, signup: NewSignup) -> Result<VolunteerSignup>;

    async fn find_by_id(&self, id: SignupId) -> Result<Option<VolunteerSignup>>;

    async fn find_by_pair(&self, event_id: EventId, volunteer_id: UserId) -> Result<Option<VolunteerSignup>>;

    /// Move a pending signup to a decision. Approval under the approved-only
    /// policy re-checks the seat count in the same critical section.
    async fn transition_status(&self, id: SignupId, change: StatusChange) -> Result<VolunteerSignup>;

    async fn update_hours(&self, id: SignupId, hours: f64) -> Result<VolunteerSignup>;

    async fn update_feedback(&self, id: SignupId, feedback: String) -> Result<VolunteerSignup>;

    /// Replace the role on the pair's signup; `None` when there is no such signup
    async fn update_role(
        &self,
        event_id: EventId,
        volunteer_id: UserId,
        role: String,
    ) -> Result<Option<VolunteerSignup>>;

    /// Returns whether a row was removed
    async fn delete(&self, event_id: EventId, volunteer_id: UserId) -> Result<bool>;

    async fn list_for_event(&self, event_id: EventId) -> Result<Vec<VolunteerSignup>>;

    async fn list_for_volunteer(&self, volunteer_id: UserId) -> Result<Vec<VolunteerSignup>>;

    async fn list_all(&self) -> Result<Vec<VolunteerSignup>>;
}

#[async_trait]
pub trait QueryRepository: Send + Sync {
    async fn create(&self, query: NewQuery) -> Result<Query>;

    async fn find_by_id(&self, id: QueryId) -> Result<Option<Query>>;

    /// Set the response only if none exists and the query is still pending
    async fn record_response(&self, id: QueryId, response: String) -> Result<ResponseOutcome>;

    /// Close the query; `None` when it was already closed
    async fn close(&self, id: QueryId) -> Result<Option<Query>>;

    async fn list_for_event(&self, event_id: EventId) -> Result<Vec<Query>>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Query>>;
}

/// Build an ILIKE pattern matching `term` literally anywhere in the column
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
