use crate::domain::{models::ticket::Ticket, ports::TicketRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteTicketRepo {
    pool: SqlitePool,
}

impl SqliteTicketRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for SqliteTicketRepo {
    async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError> {
        sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (id, registration_id, event_id, attendee_id, qr_payload, status, issued_at, used_at, cancelled_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&ticket.id)
            .bind(&ticket.registration_id)
            .bind(&ticket.event_id)
            .bind(&ticket.attendee_id)
            .bind(&ticket.qr_payload)
            .bind(ticket.status)
            .bind(ticket.issued_at)
            .bind(ticket.used_at)
            .bind(ticket.cancelled_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_payload(&self, qr_payload: &str) -> Result<Option<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE qr_payload = ?")
            .bind(qr_payload)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_registration(&self, registration_id: &str) -> Result<Option<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE registration_id = ?")
            .bind(registration_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list_for_attendee(&self, attendee_id: &str) -> Result<Vec<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE attendee_id = ? ORDER BY issued_at DESC")
            .bind(attendee_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn mark_used(&self, qr_payload: &str, at: DateTime<Utc>) -> Result<Option<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET status = 'USED', used_at = ?
             WHERE qr_payload = ? AND status = 'ACTIVE'
             RETURNING *"
        )
            .bind(at)
            .bind(qr_payload)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }
}
