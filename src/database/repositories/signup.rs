//! Volunteer signup repository implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::SignupRepository;
use crate::models::{
    CapacityPolicy, EventId, EventStatus, NewSignup, SignupId, SignupStatus, StatusChange, UserId,
    VolunteerSignup,
};
use crate::utils::errors::{Result, VoloConnectError};
use crate::utils::logging::log_database_operation;

const SIGNUP_COLUMNS: &str = "id, event_id, volunteer_id, role, skills, available_hours, special_needs, notes, hours_contributed, feedback, status, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgSignupRepository {
    pool: PgPool,
    policy: CapacityPolicy,
}

impl PgSignupRepository {
    pub fn new(pool: PgPool, policy: CapacityPolicy) -> Self {
        Self { pool, policy }
    }

    /// Lock the event row for the rest of the transaction
    async fn lock_event(
        tx: &mut Transaction<'_, Postgres>,
        event_id: EventId,
    ) -> Result<(i32, EventStatus)> {
        let row: Option<(i32, EventStatus)> = sqlx::query_as(
            "SELECT max_volunteers, status FROM events WHERE id = $1 FOR UPDATE"
        )
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await?;

        row.ok_or_else(|| VoloConnectError::not_found("event", event_id))
    }

    async fn seats_taken(
        tx: &mut Transaction<'_, Postgres>,
        event_id: EventId,
        counts_pending: bool,
    ) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM volunteer_signups
            WHERE event_id = $1 AND (status = 'approved' OR ($2 AND status = 'pending'))
            "#
        )
        .bind(event_id)
        .bind(counts_pending)
        .fetch_one(&mut **tx)
        .await?;

        Ok(count)
    }

    async fn fetch_required(&self, id: SignupId) -> Result<VolunteerSignup> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| VoloConnectError::not_found("signup", id))
    }
}

fn duplicate_signup(event_id: EventId, volunteer_id: UserId) -> VoloConnectError {
    VoloConnectError::Conflict(format!(
        "volunteer {} is already signed up for event {}",
        volunteer_id, event_id
    ))
}

#[async_trait]
impl SignupRepository for PgSignupRepository {
    async fn create_reserving_seat(&self, signup: NewSignup) -> Result<VolunteerSignup> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;

        let (max_volunteers, event_status) = Self::lock_event(&mut tx, signup.event_id).await?;
        if event_status != EventStatus::Active {
            return Err(VoloConnectError::invalid_transition(event_status, "signup"));
        }

        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM volunteer_signups WHERE event_id = $1 AND volunteer_id = $2)"
        )
        .bind(signup.event_id)
        .bind(signup.volunteer_id)
        .fetch_one(&mut *tx)
        .await?;
        if exists {
            return Err(duplicate_signup(signup.event_id, signup.volunteer_id));
        }

        let taken = Self::seats_taken(&mut tx, signup.event_id, self.policy.counts_pending()).await?;
        if taken >= i64::from(max_volunteers) {
            return Err(VoloConnectError::Capacity {
                event_id: signup.event_id,
                max_volunteers,
            });
        }

        let now = Utc::now();
        let inserted = sqlx::query_as::<_, VolunteerSignup>(&format!(
            r#"
            INSERT INTO volunteer_signups (event_id, volunteer_id, role, skills, available_hours, special_needs, notes, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SIGNUP_COLUMNS
        ))
        .bind(signup.event_id)
        .bind(signup.volunteer_id)
        .bind(&signup.role)
        .bind(&signup.skills)
        .bind(&signup.available_hours)
        .bind(&signup.special_needs)
        .bind(&signup.notes)
        .bind(signup.status)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await;

        // The unique constraint is the backstop for writers that bypass the event lock
        let inserted = match inserted {
            Ok(row) => row,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(duplicate_signup(signup.event_id, signup.volunteer_id));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        log_database_operation("insert", "volunteer_signups", started.elapsed().as_millis() as u64, true);

        Ok(inserted)
    }

    async fn find_by_id(&self, id: SignupId) -> Result<Option<VolunteerSignup>> {
        let signup = sqlx::query_as::<_, VolunteerSignup>(&format!(
            "SELECT {} FROM volunteer_signups WHERE id = $1",
            SIGNUP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(signup)
    }

    async fn find_by_pair(&self, event_id: EventId, volunteer_id: UserId) -> Result<Option<VolunteerSignup>> {
        let signup = sqlx::query_as::<_, VolunteerSignup>(&format!(
            "SELECT {} FROM volunteer_signups WHERE event_id = $1 AND volunteer_id = $2",
            SIGNUP_COLUMNS
        ))
        .bind(event_id)
        .bind(volunteer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(signup)
    }

    async fn transition_status(&self, id: SignupId, change: StatusChange) -> Result<VolunteerSignup> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;

        let row: Option<(EventId, SignupStatus)> = sqlx::query_as(
            "SELECT event_id, status FROM volunteer_signups WHERE id = $1 FOR UPDATE"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let (event_id, current) = row.ok_or_else(|| VoloConnectError::not_found("signup", id))?;

        if !current.can_transition_to(change.status) {
            return Err(VoloConnectError::invalid_transition(current, change.status));
        }

        if change.status == SignupStatus::Approved && !self.policy.holds_seat(current) {
            let (max_volunteers, _) = Self::lock_event(&mut tx, event_id).await?;
            let taken = Self::seats_taken(&mut tx, event_id, self.policy.counts_pending()).await?;
            if taken >= i64::from(max_volunteers) {
                return Err(VoloConnectError::Capacity { event_id, max_volunteers });
            }
        }

        let updated = sqlx::query_as::<_, VolunteerSignup>(&format!(
            r#"
            UPDATE volunteer_signups
            SET status = $2, feedback = COALESCE($3, feedback), updated_at = $4
            WHERE id = $1
            RETURNING {}
            "#,
            SIGNUP_COLUMNS
        ))
        .bind(id)
        .bind(change.status)
        .bind(change.feedback)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        log_database_operation("update_status", "volunteer_signups", started.elapsed().as_millis() as u64, true);

        Ok(updated)
    }

    async fn update_hours(&self, id: SignupId, hours: f64) -> Result<VolunteerSignup> {
        sqlx::query("UPDATE volunteer_signups SET hours_contributed = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(hours)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        self.fetch_required(id).await
    }

    async fn update_feedback(&self, id: SignupId, feedback: String) -> Result<VolunteerSignup> {
        sqlx::query("UPDATE volunteer_signups SET feedback = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(feedback)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        self.fetch_required(id).await
    }

    async fn update_role(
        &self,
        event_id: EventId,
        volunteer_id: UserId,
        role: String,
    ) -> Result<Option<VolunteerSignup>> {
        let signup = sqlx::query_as::<_, VolunteerSignup>(&format!(
            r#"
            UPDATE volunteer_signups SET role = $3, updated_at = $4
            WHERE event_id = $1 AND volunteer_id = $2
            RETURNING {}
            "#,
            SIGNUP_COLUMNS
        ))
        .bind(event_id)
        .bind(volunteer_id)
        .bind(role)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(signup)
    }

    async fn delete(&self, event_id: EventId, volunteer_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM volunteer_signups WHERE event_id = $1 AND volunteer_id = $2")
            .bind(event_id)
            .bind(volunteer_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_event(&self, event_id: EventId) -> Result<Vec<VolunteerSignup>> {
        let signups = sqlx::query_as::<_, VolunteerSignup>(&format!(
            "SELECT {} FROM volunteer_signups WHERE event_id = $1 ORDER BY id ASC",
            SIGNUP_COLUMNS
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(signups)
    }

    async fn list_for_volunteer(&self, volunteer_id: UserId) -> Result<Vec<VolunteerSignup>> {
        let signups = sqlx::query_as::<_, VolunteerSignup>(&format!(
            "SELECT {} FROM volunteer_signups WHERE volunteer_id = $1 ORDER BY id ASC",
            SIGNUP_COLUMNS
        ))
        .bind(volunteer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(signups)
    }

    async fn list_all(&self) -> Result<Vec<VolunteerSignup>> {
        let signups = sqlx::query_as::<_, VolunteerSignup>(&format!(
            "SELECT {} FROM volunteer_signups ORDER BY id ASC",
            SIGNUP_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(signups)
    }
}
