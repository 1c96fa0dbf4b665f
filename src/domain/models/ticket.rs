use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::RngCore;

/// Random bytes behind a QR payload (256 bits).
const QR_PAYLOAD_BYTES: usize = 32;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Active,
    Used,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Ticket {
    pub id: String,
    pub registration_id: String,
    pub event_id: String,
    pub attendee_id: String,
    pub qr_payload: String,
    pub status: TicketStatus,
    pub issued_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn issue(registration_id: String, event_id: String, attendee_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            registration_id,
            event_id,
            attendee_id,
            qr_payload: generate_qr_payload(),
            status: TicketStatus::Active,
            issued_at: Utc::now(),
            used_at: None,
            cancelled_at: None,
        }
    }
}

pub fn generate_qr_payload() -> String {
    let mut bytes = [0u8; QR_PAYLOAD_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Result of presenting a QR payload at the door.
#[derive(Debug, Serialize)]
#[serde(tag = "result", content = "ticket", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanOutcome {
    Valid(Ticket),
    AlreadyUsed(Ticket),
    Cancelled(Ticket),
    NotFound,
}
