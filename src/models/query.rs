//! Q&A query model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::{EventId, QueryId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "query_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    #[default]
    Pending,
    Responded,
    Closed,
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryStatus::Pending => write!(f, "pending"),
            QueryStatus::Responded => write!(f, "responded"),
            QueryStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Query {
    pub id: QueryId,
    pub event_id: EventId,
    pub author_id: UserId,
    pub subject: Option<String>,
    pub message: String,
    pub response: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub status: QueryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQueryRequest {
    pub subject: Option<String>,
    pub message: String,
}

impl SubmitQueryRequest {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            subject: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewQuery {
    pub event_id: EventId,
    pub author_id: UserId,
    pub subject: Option<String>,
    pub message: String,
}

/// Outcome of a guarded response write
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    Recorded(Query),
    /// The query already carried a response; it is returned untouched
    AlreadyResponded(Query),
    /// The query was closed before any response
    Closed(Query),
}
