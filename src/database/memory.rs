//! In-process store
//!
//! Implements every repository over plain vectors behind one async mutex.
//! Each write holds the lock for its whole check-and-mutate sequence, which
//! gives the same guarantees as the row locks and constraints used by the
//! PostgreSQL repositories.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::repositories::{EventRepository, QueryRepository, SignupRepository};
use crate::models::*;
use crate::utils::errors::{Result, VoloConnectError};
use crate::utils::helpers::contains_ignore_case;

#[derive(Debug, Default)]
struct MemoryState {
    events: Vec<Event>,
    signups: Vec<VolunteerSignup>,
    queries: Vec<Query>,
    next_event_id: EventId,
    next_signup_id: SignupId,
    next_query_id: QueryId,
}

impl MemoryState {
    fn seats_taken(&self, event_id: EventId, policy: CapacityPolicy) -> i64 {
        self.signups
            .iter()
            .filter(|s| s.event_id == event_id && policy.holds_seat(s.status))
            .count() as i64
    }

    fn event_view(&self, event: &Event, policy: CapacityPolicy) -> Event {
        let mut event = event.clone();
        event.current_volunteers = self.seats_taken(event.id, policy);
        event
    }

    fn signup_mut(&mut self, id: SignupId) -> Result<&mut VolunteerSignup> {
        self.signups
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| VoloConnectError::not_found("signup", id))
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    policy: CapacityPolicy,
}

impl MemoryStore {
    pub fn new(policy: CapacityPolicy) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            policy,
        }
    }

    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(CapacityPolicy::default())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create(&self, event: NewEvent) -> Result<Event> {
        let mut state = self.state.lock().await;
        state.next_event_id += 1;
        let now = Utc::now();
        let created = Event {
            id: state.next_event_id,
            title: event.title,
            description: event.description,
            location: event.location,
            start_date: event.start_date,
            end_date: event.end_date,
            max_volunteers: event.max_volunteers,
            current_volunteers: 0,
            status: EventStatus::Active,
            organizer_id: event.organizer_id,
            required_skills: event.required_skills,
            created_at: now,
            updated_at: now,
        };
        state.events.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>> {
        let state = self.state.lock().await;
        Ok(state
            .events
            .iter()
            .find(|e| e.id == id)
            .map(|e| state.event_view(e, self.policy)))
    }

    async fn update(
        &self,
        id: EventId,
        expected_status: EventStatus,
        changes: EventChanges,
    ) -> Result<Option<Event>> {
        let mut state = self.state.lock().await;
        let Some(event) = state
            .events
            .iter_mut()
            .find(|e| e.id == id && e.status == expected_status)
        else {
            return Ok(None);
        };

        event.title = changes.title;
        event.description = changes.description;
        event.location = changes.location;
        event.start_date = changes.start_date;
        event.end_date = changes.end_date;
        event.max_volunteers = changes.max_volunteers;
        event.status = changes.status;
        event.required_skills = changes.required_skills;
        event.updated_at = Utc::now();

        let updated = event.clone();
        Ok(Some(state.event_view(&updated, self.policy)))
    }

    async fn list(&self, search: Option<&str>, organizer_id: Option<UserId>) -> Result<Vec<Event>> {
        let state = self.state.lock().await;
        Ok(state
            .events
            .iter()
            .filter(|e| {
                search.map_or(true, |term| {
                    contains_ignore_case(&e.title, term) || contains_ignore_case(&e.description, term)
                })
            })
            .filter(|e| organizer_id.map_or(true, |id| e.organizer_id == id))
            .map(|e| state.event_view(e, self.policy))
            .collect())
    }
}

#[async_trait]
impl SignupRepository for MemoryStore {
    async fn create_reserving_seat(&self, signup: NewSignup) -> Result<VolunteerSignup> {
        let mut state = self.state.lock().await;

        let event = state
            .events
            .iter()
            .find(|e| e.id == signup.event_id)
            .ok_or_else(|| VoloConnectError::not_found("event", signup.event_id))?;
        if event.status != EventStatus::Active {
            return Err(VoloConnectError::invalid_transition(event.status, "signup"));
        }
        let max_volunteers = event.max_volunteers;

        if state
            .signups
            .iter()
            .any(|s| s.event_id == signup.event_id && s.volunteer_id == signup.volunteer_id)
        {
            return Err(VoloConnectError::Conflict(format!(
                "volunteer {} is already signed up for event {}",
                signup.volunteer_id, signup.event_id
            )));
        }

        if state.seats_taken(signup.event_id, self.policy) >= i64::from(max_volunteers) {
            return Err(VoloConnectError::Capacity {
                event_id: signup.event_id,
                max_volunteers,
            });
        }

        state.next_signup_id += 1;
        let now = Utc::now();
        let created = VolunteerSignup {
            id: state.next_signup_id,
            event_id: signup.event_id,
            volunteer_id: signup.volunteer_id,
            role: signup.role,
            skills: signup.skills,
            available_hours: signup.available_hours,
            special_needs: signup.special_needs,
            notes: signup.notes,
            hours_contributed: 0.0,
            feedback: None,
            status: signup.status,
            created_at: now,
            updated_at: now,
        };
        state.signups.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: SignupId) -> Result<Option<VolunteerSignup>> {
        let state = self.state.lock().await;
        Ok(state.signups.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_pair(&self, event_id: EventId, volunteer_id: UserId) -> Result<Option<VolunteerSignup>> {
        let state = self.state.lock().await;
        Ok(state
            .signups
            .iter()
            .find(|s| s.event_id == event_id && s.volunteer_id == volunteer_id)
            .cloned())
    }

    async fn transition_status(&self, id: SignupId, change: StatusChange) -> Result<VolunteerSignup> {
        let mut state = self.state.lock().await;
        let policy = self.policy;

        let (event_id, current) = {
            let signup = state.signup_mut(id)?;
            (signup.event_id, signup.status)
        };
        if !current.can_transition_to(change.status) {
            return Err(VoloConnectError::invalid_transition(current, change.status));
        }

        if change.status == SignupStatus::Approved && !policy.holds_seat(current) {
            let max_volunteers = state
                .events
                .iter()
                .find(|e| e.id == event_id)
                .map(|e| e.max_volunteers)
                .ok_or_else(|| VoloConnectError::not_found("event", event_id))?;
            if state.seats_taken(event_id, policy) >= i64::from(max_volunteers) {
                return Err(VoloConnectError::Capacity { event_id, max_volunteers });
            }
        }

        let signup = state.signup_mut(id)?;
        signup.status = change.status;
        if let Some(feedback) = change.feedback {
            signup.feedback = Some(feedback);
        }
        signup.updated_at = Utc::now();
        Ok(signup.clone())
    }

    async fn update_hours(&self, id: SignupId, hours: f64) -> Result<VolunteerSignup> {
        let mut state = self.state.lock().await;
        let signup = state.signup_mut(id)?;
        signup.hours_contributed = hours;
        signup.updated_at = Utc::now();
        Ok(signup.clone())
    }

    async fn update_feedback(&self, id: SignupId, feedback: String) -> Result<VolunteerSignup> {
        let mut state = self.state.lock().await;
        let signup = state.signup_mut(id)?;
        signup.feedback = Some(feedback);
        signup.updated_at = Utc::now();
        Ok(signup.clone())
    }

    async fn update_role(
        &self,
        event_id: EventId,
        volunteer_id: UserId,
        role: String,
    ) -> Result<Option<VolunteerSignup>> {
        let mut state = self.state.lock().await;
        let Some(signup) = state
            .signups
            .iter_mut()
            .find(|s| s.event_id == event_id && s.volunteer_id == volunteer_id)
        else {
            return Ok(None);
        };

        signup.role = role;
        signup.updated_at = Utc::now();
        Ok(Some(signup.clone()))
    }

    async fn delete(&self, event_id: EventId, volunteer_id: UserId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let before = state.signups.len();
        state
            .signups
            .retain(|s| !(s.event_id == event_id && s.volunteer_id == volunteer_id));
        Ok(state.signups.len() < before)
    }

    async fn list_for_event(&self, event_id: EventId) -> Result<Vec<VolunteerSignup>> {
        let state = self.state.lock().await;
        Ok(state
            .signups
            .iter()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn list_for_volunteer(&self, volunteer_id: UserId) -> Result<Vec<VolunteerSignup>> {
        let state = self.state.lock().await;
        Ok(state
            .signups
            .iter()
            .filter(|s| s.volunteer_id == volunteer_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<VolunteerSignup>> {
        let state = self.state.lock().await;
        Ok(state.signups.clone())
    }
}

#[async_trait]
impl QueryRepository for MemoryStore {
    async fn create(&self, query: NewQuery) -> Result<Query> {
        let mut state = self.state.lock().await;
        state.next_query_id += 1;
        let now = Utc::now();
        let created = Query {
            id: state.next_query_id,
            event_id: query.event_id,
            author_id: query.author_id,
            subject: query.subject,
            message: query.message,
            response: None,
            responded_at: None,
            status: QueryStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.queries.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: QueryId) -> Result<Option<Query>> {
        let state = self.state.lock().await;
        Ok(state.queries.iter().find(|q| q.id == id).cloned())
    }

    async fn record_response(&self, id: QueryId, response: String) -> Result<ResponseOutcome> {
        let mut state = self.state.lock().await;
        let query = state
            .queries
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| VoloConnectError::not_found("query", id))?;

        if query.response.is_some() {
            return Ok(ResponseOutcome::AlreadyResponded(query.clone()));
        }
        if query.status != QueryStatus::Pending {
            return Ok(ResponseOutcome::Closed(query.clone()));
        }

        let now = Utc::now();
        query.response = Some(response);
        query.responded_at = Some(now);
        query.status = QueryStatus::Responded;
        query.updated_at = now;
        Ok(ResponseOutcome::Recorded(query.clone()))
    }

    async fn close(&self, id: QueryId) -> Result<Option<Query>> {
        let mut state = self.state.lock().await;
        let Some(query) = state
            .queries
            .iter_mut()
            .find(|q| q.id == id && q.status != QueryStatus::Closed)
        else {
            return Ok(None);
        };

        query.status = QueryStatus::Closed;
        query.updated_at = Utc::now();
        Ok(Some(query.clone()))
    }

    async fn list_for_event(&self, event_id: EventId) -> Result<Vec<Query>> {
        let state = self.state.lock().await;
        Ok(state
            .queries
            .iter()
            .filter(|q| q.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Query>> {
        let state = self.state.lock().await;
        Ok(state
            .queries
            .iter()
            .filter(|q| q.author_id == user_id)
            .cloned()
            .collect())
    }
}
