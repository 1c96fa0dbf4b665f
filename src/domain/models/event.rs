use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use std::collections::BTreeSet;
use uuid::Uuid;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Draft,
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn admits_registrations(self) -> bool {
        matches!(self, EventStatus::Upcoming | EventStatus::Ongoing)
    }

    /// Status implied by the wall clock. Draft and Cancelled are never moved by time.
    pub fn at(self, start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> EventStatus {
        match self {
            EventStatus::Upcoming | EventStatus::Ongoing => {
                if now >= end {
                    EventStatus::Completed
                } else if now >= start {
                    EventStatus::Ongoing
                } else {
                    self
                }
            }
            other => other,
        }
    }

    /// Statuses the wall clock can move an event into or out of.
    pub fn is_time_driven(self) -> bool {
        matches!(self, EventStatus::Upcoming | EventStatus::Ongoing | EventStatus::Completed)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub category: String,
    pub tags: Json<BTreeSet<String>>,
    pub is_online: bool,
    pub capacity: i32,
    pub registered_count: i32,
    pub price_cents: i64,
    pub status: EventStatus,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

pub struct NewEventParams {
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub category: String,
    pub tags: BTreeSet<String>,
    pub is_online: bool,
    pub capacity: i32,
    pub price_cents: i64,
    pub draft: bool,
}

impl NewEventParams {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Event name is required".into()));
        }
        if self.start_time >= self.end_time {
            return Err(AppError::Validation("End time must be after start time".into()));
        }
        if self.start_time <= now {
            return Err(AppError::Validation("Event start time must be in the future".into()));
        }
        if self.capacity < 1 {
            return Err(AppError::Validation("Capacity must be at least 1".into()));
        }
        if self.price_cents < 0 {
            return Err(AppError::Validation("Price cannot be negative".into()));
        }
        Ok(())
    }
}

impl Event {
    pub fn new(creator_id: String, params: NewEventParams, now: DateTime<Utc>) -> Result<Self, AppError> {
        params.validate(now)?;

        let tags = params.tags.into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: params.name.trim().to_string(),
            description: params.description,
            start_time: params.start_time,
            end_time: params.end_time,
            location: params.location,
            category: params.category,
            tags: Json(tags),
            is_online: params.is_online,
            capacity: params.capacity,
            registered_count: 0,
            price_cents: params.price_cents,
            status: if params.draft { EventStatus::Draft } else { EventStatus::Upcoming },
            creator_id,
            created_at: now,
            cancelled_at: None,
        })
    }

    pub fn is_owned_by(&self, principal_id: &str) -> bool {
        self.creator_id == principal_id
    }

    /// Applies time-driven transitions the background sweep may not have persisted yet.
    pub fn with_current_status(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.status.at(self.start_time, self.end_time, now);
        self
    }
}

/// What a single cancel transaction changed.
#[derive(Debug, Clone)]
pub struct EventCancellation {
    pub event: Event,
    pub registrations: u64,
    pub tickets: u64,
}

#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub category: Option<String>,
    pub q: Option<String>,
    pub online: Option<bool>,
    pub status: Option<EventStatus>,
    pub creator_id: Option<String>,
}
