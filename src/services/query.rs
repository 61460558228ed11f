//! Q&A service
//!
//! Questions posted on an event page and the organizer's single answer.

use tracing::{debug, warn};

use super::auth::{require_organizer, AuthContext, Permission};
use super::notification::{Notification, NotificationService};
use crate::database::DatabaseService;
use crate::models::*;
use crate::utils::errors::{Result, ValidationErrors, VoloConnectError};
use crate::utils::helpers::{check_max_length, check_text_length, non_blank};
use crate::utils::logging::log_query_action;

pub const SUBJECT_MAX: usize = 200;
pub const MESSAGE_MAX: usize = 2000;
pub const RESPONSE_MAX: usize = 2000;

#[derive(Debug, Clone)]
pub struct QueryService {
    db: DatabaseService,
    notifications: NotificationService,
}

impl QueryService {
    pub fn new(db: DatabaseService, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    pub async fn submit_query(
        &self,
        author_id: UserId,
        event_id: EventId,
        request: SubmitQueryRequest,
    ) -> Result<Query> {
        debug!(author_id = author_id, event_id = event_id, "Submitting query");
        self.find_event(event_id).await?;

        let mut errors = ValidationErrors::new();
        check_text_length(&mut errors, "message", "Message", &request.message, 1, MESSAGE_MAX);
        check_max_length(&mut errors, "subject", "Subject", request.subject.as_deref(), SUBJECT_MAX);
        errors.into_result()?;

        let query = self
            .db
            .queries
            .create(NewQuery {
                event_id,
                author_id,
                subject: non_blank(request.subject),
                message: request.message.trim().to_string(),
            })
            .await?;

        log_query_action(query.id, event_id, "submit", author_id);
        Ok(query)
    }

    /// Answer a query. Only the organizer of the owning event may respond,
    /// and only once.
    pub async fn respond_to_query(&self, requester_id: UserId, query_id: QueryId, response: String) -> Result<Query> {
        let query = self.find_query(query_id).await?;
        let event = self.find_event(query.event_id).await?;
        require_organizer(&event, requester_id, "respond to query")?;

        let mut errors = ValidationErrors::new();
        check_text_length(&mut errors, "response", "Response", &response, 1, RESPONSE_MAX);
        errors.into_result()?;

        match self
            .db
            .queries
            .record_response(query_id, response.trim().to_string())
            .await?
        {
            ResponseOutcome::Recorded(query) => {
                log_query_action(query_id, event.id, "respond", requester_id);
                self.notifications
                    .send(Notification::query_responded(&event, &query))
                    .await;
                Ok(query)
            }
            ResponseOutcome::AlreadyResponded(_) => {
                warn!(query_id = query_id, "Query already has a response");
                Err(VoloConnectError::Conflict(format!(
                    "query {} has already been answered",
                    query_id
                )))
            }
            ResponseOutcome::Closed(query) => Err(VoloConnectError::invalid_transition(
                query.status,
                QueryStatus::Responded,
            )),
        }
    }

    /// Close a query; open to its author and the event organizer
    pub async fn close_query(&self, requester_id: UserId, query_id: QueryId) -> Result<Query> {
        let query = self.find_query(query_id).await?;
        let event = self.find_event(query.event_id).await?;
        AuthContext::for_query(requester_id, &event, &query)
            .require_any(&[Permission::Organizer, Permission::QueryAuthor], "close query")?;

        let closed = self
            .db
            .queries
            .close(query_id)
            .await?
            .ok_or_else(|| VoloConnectError::invalid_transition(QueryStatus::Closed, QueryStatus::Closed))?;

        log_query_action(query_id, event.id, "close", requester_id);
        Ok(closed)
    }

    pub async fn list_for_event(&self, event_id: EventId) -> Result<Vec<Query>> {
        self.db.queries.list_for_event(event_id).await
    }

    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Query>> {
        self.db.queries.list_for_user(user_id).await
    }

    async fn find_event(&self, event_id: EventId) -> Result<Event> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| VoloConnectError::not_found("event", event_id))
    }

    async fn find_query(&self, query_id: QueryId) -> Result<Query> {
        self.db
            .queries
            .find_by_id(query_id)
            .await?
            .ok_or_else(|| VoloConnectError::not_found("query", query_id))
    }
}
