//! Q&A query repository implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::QueryRepository;
use crate::models::{EventId, NewQuery, Query, QueryId, QueryStatus, ResponseOutcome, UserId};
use crate::utils::errors::{Result, VoloConnectError};

const QUERY_COLUMNS: &str = "id, event_id, author_id, subject, message, response, responded_at, status, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgQueryRepository {
    pool: PgPool,
}

impl PgQueryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryRepository for PgQueryRepository {
    async fn create(&self, query: NewQuery) -> Result<Query> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Query>(&format!(
            r#"
            INSERT INTO queries (event_id, author_id, subject, message, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            QUERY_COLUMNS
        ))
        .bind(query.event_id)
        .bind(query.author_id)
        .bind(query.subject)
        .bind(query.message)
        .bind(QueryStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: QueryId) -> Result<Option<Query>> {
        let query = sqlx::query_as::<_, Query>(&format!(
            "SELECT {} FROM queries WHERE id = $1",
            QUERY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(query)
    }

    async fn record_response(&self, id: QueryId, response: String) -> Result<ResponseOutcome> {
        let now = Utc::now();
        let updated = sqlx::query_as::<_, Query>(&format!(
            r#"
            UPDATE queries
            SET response = $2, status = 'responded', responded_at = $3, updated_at = $3
            WHERE id = $1 AND response IS NULL AND status = 'pending'
            RETURNING {}
            "#,
            QUERY_COLUMNS
        ))
        .bind(id)
        .bind(response)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(query) = updated {
            return Ok(ResponseOutcome::Recorded(query));
        }

        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| VoloConnectError::not_found("query", id))?;
        if existing.response.is_some() {
            Ok(ResponseOutcome::AlreadyResponded(existing))
        } else {
            Ok(ResponseOutcome::Closed(existing))
        }
    }

    async fn close(&self, id: QueryId) -> Result<Option<Query>> {
        let closed = sqlx::query_as::<_, Query>(&format!(
            r#"
            UPDATE queries SET status = 'closed', updated_at = $2
            WHERE id = $1 AND status <> 'closed'
            RETURNING {}
            "#,
            QUERY_COLUMNS
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(closed)
    }

    async fn list_for_event(&self, event_id: EventId) -> Result<Vec<Query>> {
        let queries = sqlx::query_as::<_, Query>(&format!(
            "SELECT {} FROM queries WHERE event_id = $1 ORDER BY id ASC",
            QUERY_COLUMNS
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(queries)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Query>> {
        let queries = sqlx::query_as::<_, Query>(&format!(
            "SELECT {} FROM queries WHERE author_id = $1 ORDER BY id ASC",
            QUERY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(queries)
    }
}
