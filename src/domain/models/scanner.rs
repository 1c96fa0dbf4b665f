use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EventScanner {
    pub event_id: String,
    pub scanner_id: String,
    pub added_at: DateTime<Utc>,
}

impl EventScanner {
    pub fn new(event_id: String, scanner_id: String) -> Self {
        Self { event_id, scanner_id, added_at: Utc::now() }
    }
}
