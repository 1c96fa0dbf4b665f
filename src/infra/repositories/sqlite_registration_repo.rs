use crate::domain::{
    models::{
        dashboard::{ActivityKind, ActivityRow, AttendanceTotals, RegistrationTotals},
        registration::{EventAttendee, Registration},
    },
    ports::RegistrationRepository,
};
use crate::error::AppError;
use crate::infra::repositories::registration_activity_source;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteRegistrationRepo {
    pool: SqlitePool,
}

impl SqliteRegistrationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for SqliteRegistrationRepo {
    async fn create(&self, registration: &Registration) -> Result<Registration, AppError> {
        sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (id, event_id, attendee_id, status, created_at, cancelled_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&registration.id)
            .bind(&registration.event_id)
            .bind(&registration.attendee_id)
            .bind(registration.status)
            .bind(registration.created_at)
            .bind(registration.cancelled_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::AlreadyRegistered,
                _ => AppError::from(e),
            })
    }

    async fn discard(&self, registration: &Registration) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let deleted = sqlx::query("DELETE FROM registrations WHERE id = ?")
            .bind(&registration.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;
        if deleted.rows_affected() == 0 {
            return Ok(());
        }

        sqlx::query("UPDATE events SET registered_count = MAX(registered_count - 1, 0) WHERE id = ?")
            .bind(&registration.event_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn find_confirmed(&self, event_id: &str, attendee_id: &str) -> Result<Option<Registration>, AppError> {
        sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE event_id = ? AND attendee_id = ? AND status = 'CONFIRMED'"
        )
            .bind(event_id)
            .bind(attendee_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list_confirmed_for_attendee(&self, attendee_id: &str) -> Result<Vec<Registration>, AppError> {
        sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE attendee_id = ? AND status = 'CONFIRMED' ORDER BY created_at DESC"
        )
            .bind(attendee_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list_for_event(&self, event_id: &str) -> Result<Vec<EventAttendee>, AppError> {
        sqlx::query_as::<_, EventAttendee>(
            "SELECT r.*, t.status AS ticket_status, t.used_at AS checked_in_at
             FROM registrations r LEFT JOIN tickets t ON t.registration_id = r.id
             WHERE r.event_id = ?
             ORDER BY r.created_at ASC"
        )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn cancel(&self, id: &str, at: DateTime<Utc>) -> Result<Option<Registration>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let cancelled = sqlx::query_as::<_, Registration>(
            "UPDATE registrations SET status = 'CANCELLED', cancelled_at = ?
             WHERE id = ? AND status = 'CONFIRMED'
             RETURNING *"
        )
            .bind(at)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::from)?;
        let Some(cancelled) = cancelled else {
            return Ok(None);
        };

        sqlx::query("UPDATE events SET registered_count = MAX(registered_count - 1, 0) WHERE id = ?")
            .bind(&cancelled.event_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;

        sqlx::query(
            "UPDATE tickets SET status = 'CANCELLED', cancelled_at = ?
             WHERE registration_id = ? AND status <> 'CANCELLED'"
        )
            .bind(at)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(Some(cancelled))
    }

    async fn attendance_for_event(&self, event_id: &str) -> Result<AttendanceTotals, AppError> {
        sqlx::query_as::<_, AttendanceTotals>(
            "SELECT COALESCE(SUM(CASE WHEN r.status = 'CONFIRMED' THEN 1 ELSE 0 END), 0) AS confirmed,
                    COALESCE(SUM(CASE WHEN r.status = 'CANCELLED' THEN 1 ELSE 0 END), 0) AS cancelled,
                    COALESCE(SUM(CASE WHEN r.status = 'CONFIRMED' AND t.status = 'USED' THEN 1 ELSE 0 END), 0) AS checked_in
             FROM registrations r LEFT JOIN tickets t ON t.registration_id = r.id
             WHERE r.event_id = ?"
        )
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn totals_for_creator(&self, creator_id: &str) -> Result<RegistrationTotals, AppError> {
        sqlx::query_as::<_, RegistrationTotals>(
            "SELECT COUNT(r.id) AS total_registrations, COALESCE(SUM(e.price_cents), 0) AS revenue_cents
             FROM registrations r JOIN events e ON e.id = r.event_id
             WHERE e.creator_id = ? AND r.status = 'CONFIRMED'"
        )
            .bind(creator_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn recent_activity(&self, kind: ActivityKind, organizer_id: Option<&str>, limit: i64) -> Result<Vec<ActivityRow>, AppError> {
        let Some((column, condition)) = registration_activity_source(kind) else {
            return Ok(vec![]);
        };

        let sql = format!(
            "SELECT r.event_id AS event_id, e.name AS event_name, r.attendee_id AS actor_id, {column} AS occurred_at
             FROM registrations r JOIN events e ON e.id = r.event_id
             WHERE {condition} AND (? IS NULL OR e.creator_id = ?)
             ORDER BY {column} DESC LIMIT ?"
        );
        sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(organizer_id)
            .bind(organizer_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }
}
