use crate::domain::models::event::{EventStatus, NewEventParams};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub is_online: bool,
    pub capacity: i32,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub draft: bool,
}

impl From<CreateEventRequest> for NewEventParams {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            start_time: req.start_time,
            end_time: req.end_time,
            location: req.location,
            category: req.category,
            tags: req.tags,
            is_online: req.is_online,
            capacity: req.capacity,
            price_cents: req.price_cents,
            draft: req.draft,
        }
    }
}

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub online: Option<bool>,
    pub status: Option<EventStatus>,
    /// Only the caller's own events, drafts included.
    #[serde(default)]
    pub mine: bool,
}

#[derive(Deserialize)]
pub struct AddScannerRequest {
    pub scanner_id: String,
}

#[derive(Deserialize)]
pub struct BulkRegisterRequest {
    pub attendee_ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct ScanRequest {
    pub qr_payload: String,
}

#[derive(Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
    #[serde(default)]
    pub mine: bool,
}

#[derive(Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<i64>,
}
