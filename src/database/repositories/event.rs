//! Event repository implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::time::Instant;

use super::{like_pattern, EventRepository};
use crate::models::{CapacityPolicy, Event, EventChanges, EventId, EventStatus, NewEvent, UserId};
use crate::utils::errors::{Result, VoloConnectError};
use crate::utils::logging::log_database_operation;

/// Column list shared by every event read. `$1` is the capacity policy flag:
/// when true, pending signups count towards `current_volunteers`.
const EVENT_SELECT: &str = r#"
    SELECT e.id, e.title, e.description, e.location, e.start_date, e.end_date, e.max_volunteers,
           (SELECT COUNT(*) FROM volunteer_signups s
             WHERE s.event_id = e.id
               AND (s.status = 'approved' OR ($1 AND s.status = 'pending'))) AS current_volunteers,
           e.status, e.organizer_id, e.required_skills, e.created_at, e.updated_at
    FROM events e
"#;

#[derive(Clone, Debug)]
pub struct PgEventRepository {
    pool: PgPool,
    policy: CapacityPolicy,
}

impl PgEventRepository {
    pub fn new(pool: PgPool, policy: CapacityPolicy) -> Self {
        Self { pool, policy }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, event: NewEvent) -> Result<Event> {
        let started = Instant::now();
        let now = Utc::now();
        let (id,): (EventId,) = sqlx::query_as(
            r#"
            INSERT INTO events (title, description, location, start_date, end_date, max_volunteers, status, organizer_id, required_skills, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#
        )
        .bind(event.title)
        .bind(event.description)
        .bind(event.location)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.max_volunteers)
        .bind(EventStatus::Active)
        .bind(event.organizer_id)
        .bind(event.required_skills)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        log_database_operation("insert", "events", started.elapsed().as_millis() as u64, true);

        let created = self.find_by_id(id).await?;
        created.ok_or_else(|| VoloConnectError::not_found("event", id))
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!("{} WHERE e.id = $2", EVENT_SELECT))
            .bind(self.policy.counts_pending())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn update(
        &self,
        id: EventId,
        expected_status: EventStatus,
        changes: EventChanges,
    ) -> Result<Option<Event>> {
        let started = Instant::now();
        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = $3,
                description = $4,
                location = $5,
                start_date = $6,
                end_date = $7,
                max_volunteers = $8,
                status = $9,
                required_skills = $10,
                updated_at = $11
            WHERE id = $1 AND status = $2
            "#
        )
        .bind(id)
        .bind(expected_status)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.location)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(changes.max_volunteers)
        .bind(changes.status)
        .bind(changes.required_skills)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        log_database_operation("update", "events", started.elapsed().as_millis() as u64, true);

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn list(&self, search: Option<&str>, organizer_id: Option<UserId>) -> Result<Vec<Event>> {
        let pattern = search.map(like_pattern);
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"{}
            WHERE ($2::text IS NULL OR e.title ILIKE $2 OR e.description ILIKE $2)
              AND ($3::bigint IS NULL OR e.organizer_id = $3)
            ORDER BY e.id ASC
            "#,
            EVENT_SELECT
        ))
        .bind(self.policy.counts_pending())
        .bind(pattern)
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
