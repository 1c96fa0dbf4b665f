use crate::domain::{models::ticket::Ticket, ports::TicketRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresTicketRepo {
    pool: PgPool,
}

impl PostgresTicketRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepo {
    async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError> {
        sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (id, registration_id, event_id, attendee_id, qr_payload, status, issued_at, used_at, cancelled_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
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
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE qr_payload = $1")
            .bind(qr_payload)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_registration(&self, registration_id: &str) -> Result<Option<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE registration_id = $1")
            .bind(registration_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list_for_attendee(&self, attendee_id: &str) -> Result<Vec<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE attendee_id = $1 ORDER BY issued_at DESC")
            .bind(attendee_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn mark_used(&self, qr_payload: &str, at: DateTime<Utc>) -> Result<Option<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET status = 'USED', used_at = $1
             WHERE qr_payload = $2 AND status = 'ACTIVE'
             RETURNING *"
        )
            .bind(at)
            .bind(qr_payload)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }
}
