use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::domain::models::ticket::TicketStatus;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub attendee_id: String,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Registration {
    pub fn new(event_id: String, attendee_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            attendee_id,
            status: RegistrationStatus::Confirmed,
            created_at: Utc::now(),
            cancelled_at: None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == RegistrationStatus::Confirmed
    }
}

/// A registration as the event creator sees it, with the door state of its ticket.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct EventAttendee {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub registration: Registration,
    pub ticket_status: Option<TicketStatus>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BulkOutcome {
    pub attendee_id: String,
    pub registration_id: Option<String>,
    pub error: Option<&'static str>,
}
