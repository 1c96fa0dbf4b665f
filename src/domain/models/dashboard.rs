use serde::Serialize;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::domain::models::event::EventStatus;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct OrganizerStats {
    pub organizer_id: String,
    pub total_events: i64,
    pub upcoming_events: i64,
    pub total_registrations: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, FromRow, Clone, Default)]
pub struct EventTotals {
    pub total_events: i64,
    pub upcoming_events: i64,
}

#[derive(Debug, FromRow, Clone, Default)]
pub struct RegistrationTotals {
    pub total_registrations: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, FromRow, Clone, Default)]
pub struct AttendanceTotals {
    pub confirmed: i64,
    pub cancelled: i64,
    pub checked_in: i64,
}

/// Per-event rollup for the organizer's event page.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct EventPerformance {
    pub event_id: String,
    pub event_name: String,
    pub status: EventStatus,
    pub capacity: i32,
    pub confirmed: i64,
    pub cancelled: i64,
    pub checked_in: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Registration,
    Cancellation,
    EventCreated,
    EventCancelled,
    EventStarted,
    EventCompleted,
}

impl ActivityKind {
    pub fn describe(self, event_name: &str) -> String {
        match self {
            ActivityKind::Registration => format!("New registration for {}", event_name),
            ActivityKind::Cancellation => format!("Registration cancelled for {}", event_name),
            ActivityKind::EventCreated => format!("New event created: {}", event_name),
            ActivityKind::EventCancelled => format!("Event cancelled: {}", event_name),
            ActivityKind::EventStarted => format!("Event started: {}", event_name),
            ActivityKind::EventCompleted => format!("Event completed: {}", event_name),
        }
    }
}

/// Raw activity row as read from a store, before it is labelled with its kind.
#[derive(Debug, FromRow, Clone)]
pub struct ActivityRow {
    pub event_id: String,
    pub event_name: String,
    pub actor_id: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct Activity {
    pub kind: ActivityKind,
    pub message: String,
    pub event_id: String,
    pub event_name: String,
    pub actor_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl Activity {
    pub fn from_row(kind: ActivityKind, row: ActivityRow) -> Self {
        Self {
            kind,
            message: kind.describe(&row.event_name),
            event_id: row.event_id,
            event_name: row.event_name,
            actor_id: row.actor_id,
            occurred_at: row.occurred_at,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct UpcomingEvent {
    pub id: String,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub location: String,
    pub registered_count: i32,
    pub capacity: i32,
}
