use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::models::{
    event::{Event, EventFilter, EventStatus, NewEventParams},
    principal::Principal,
    scanner::EventScanner,
};
use crate::domain::ports::{EventRepository, ScannerRepository};
use crate::domain::services::retry::{retry_transient, RetryPolicy};
use crate::error::AppError;

/// Attempts made when a failed reservation looks like it raced a release.
const RESERVE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    Admitted,
    Full,
    Closed,
    NotFound,
}

pub struct EventCatalog {
    events: Arc<dyn EventRepository>,
    scanners: Arc<dyn ScannerRepository>,
    retry: RetryPolicy,
}

impl EventCatalog {
    pub fn new(events: Arc<dyn EventRepository>, scanners: Arc<dyn ScannerRepository>, retry: RetryPolicy) -> Self {
        Self { events, scanners, retry }
    }

    pub async fn create_event(&self, principal: &Principal, params: NewEventParams) -> Result<Event, AppError> {
        if !principal.is_organizer() {
            return Err(AppError::Forbidden("Only organizers can create events".into()));
        }

        let event = Event::new(principal.id.clone(), params, Utc::now())?;
        let created = self.events.create(&event).await?;
        info!(event_id = %created.id, status = ?created.status, "Event created");
        Ok(created)
    }

    pub async fn publish_event(&self, id: &str, principal: &Principal) -> Result<Event, AppError> {
        self.load_owned(id, principal).await?;

        let published = self.events.publish(id).await?
            .ok_or_else(|| AppError::Conflict("Only draft events can be published".into()))?;
        info!(event_id = %id, "Event published");
        Ok(published)
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, AppError> {
        let event = retry_transient(self.retry, "get_event", move || self.events.find_by_id(id)).await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;
        Ok(event.with_current_status(Utc::now()))
    }

    /// Like [`Self::get_event`], but drafts only exist for their creator.
    pub async fn get_visible_event(&self, id: &str, principal: &Principal) -> Result<Event, AppError> {
        let event = self.get_event(id).await?;
        if event.status == EventStatus::Draft && !event.is_owned_by(&principal.id) {
            return Err(AppError::NotFound(format!("Event {} not found", id)));
        }
        Ok(event)
    }

    pub async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError> {
        let now = Utc::now();
        let wanted = filter.status;

        // Stored statuses can lag the clock, so time-driven ones are matched after normalising.
        let mut query = filter.clone();
        if wanted.is_some_and(EventStatus::is_time_driven) {
            query.status = None;
        }
        let query = &query;

        let events = retry_transient(self.retry, "list_events", move || self.events.list(query)).await?;
        Ok(events.into_iter()
            .map(|e| e.with_current_status(now))
            .filter(|e| wanted.is_none_or(|status| e.status == status))
            .collect())
    }

    /// Cancels the event and, in the same store transaction, every confirmed registration and its ticket.
    pub async fn cancel_event(&self, id: &str, principal: &Principal) -> Result<Event, AppError> {
        let event = self.load_owned(id, principal).await?;
        if event.status == EventStatus::Cancelled {
            return Err(AppError::AlreadyCancelled);
        }

        // Losing a concurrent cancel surfaces as None.
        let cancellation = self.events.cancel(id, Utc::now()).await?
            .ok_or(AppError::AlreadyCancelled)?;

        info!(
            event_id = %id,
            voided_registrations = cancellation.registrations,
            voided_tickets = cancellation.tickets,
            "Event cancelled"
        );
        Ok(cancellation.event)
    }

    pub async fn reserve_capacity(&self, id: &str) -> Result<ReserveOutcome, AppError> {
        for _ in 0..RESERVE_ATTEMPTS {
            let now = Utc::now();
            if self.events.try_reserve_seat(id, now).await? {
                return Ok(ReserveOutcome::Admitted);
            }

            let Some(event) = self.events.find_by_id(id).await? else {
                return Ok(ReserveOutcome::NotFound);
            };
            let outcome = classify_rejection(&event, now);
            if outcome != ReserveOutcome::Admitted {
                return Ok(outcome);
            }
            // A seat was released between the update and the read.
        }

        warn!(event_id = %id, "Reservation kept losing races, reporting full");
        Ok(ReserveOutcome::Full)
    }

    pub async fn release_capacity(&self, id: &str) -> Result<(), AppError> {
        self.events.release_seat(id).await
    }

    pub async fn add_scanner(&self, event_id: &str, principal: &Principal, scanner_id: &str) -> Result<EventScanner, AppError> {
        self.load_owned(event_id, principal).await?;

        let scanner_id = scanner_id.trim();
        if scanner_id.is_empty() {
            return Err(AppError::Validation("Scanner id is required".into()));
        }

        let scanner = self.scanners.add(&EventScanner::new(event_id.to_string(), scanner_id.to_string())).await?;
        info!(event_id = %event_id, scanner_id = %scanner_id, "Scanner assigned");
        Ok(scanner)
    }

    pub async fn list_scanners(&self, event_id: &str, principal: &Principal) -> Result<Vec<EventScanner>, AppError> {
        self.load_owned(event_id, principal).await?;
        retry_transient(self.retry, "list_scanners", move || self.scanners.list(event_id)).await
    }

    pub async fn remove_scanner(&self, event_id: &str, principal: &Principal, scanner_id: &str) -> Result<(), AppError> {
        self.load_owned(event_id, principal).await?;

        if !self.scanners.remove(event_id, scanner_id).await? {
            return Err(AppError::NotFound(format!("Scanner {} is not assigned to this event", scanner_id)));
        }
        info!(event_id = %event_id, scanner_id = %scanner_id, "Scanner removed");
        Ok(())
    }

    /// Whether `principal` may validate tickets for `event`.
    pub async fn may_scan(&self, event: &Event, principal: &Principal) -> Result<bool, AppError> {
        if !principal.may_scan_at_all() {
            return Ok(false);
        }
        if event.is_owned_by(&principal.id) {
            return Ok(true);
        }
        let (event_id, scanner_id) = (event.id.as_str(), principal.id.as_str());
        retry_transient(self.retry, "is_assigned", move || self.scanners.is_assigned(event_id, scanner_id)).await
    }

    pub async fn advance_statuses(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        let moved = self.events.advance_statuses(now).await?;
        for event in &moved {
            info!(event_id = %event.id, status = ?event.status, "Event status advanced");
        }
        Ok(moved)
    }

    async fn load_owned(&self, id: &str, principal: &Principal) -> Result<Event, AppError> {
        let event = self.get_event(id).await?;
        if !event.is_owned_by(&principal.id) {
            return Err(AppError::Forbidden("Only the event creator can do this".into()));
        }
        Ok(event)
    }
}

/// Why a reservation that changed nothing was refused, judged from a fresh read.
/// `Admitted` means the read shows a free seat, so the caller should try again.
fn classify_rejection(event: &Event, now: DateTime<Utc>) -> ReserveOutcome {
    let status = event.status.at(event.start_time, event.end_time, now);
    if !status.admits_registrations() || event.end_time <= now {
        ReserveOutcome::Closed
    } else if event.registered_count >= event.capacity {
        ReserveOutcome::Full
    } else {
        ReserveOutcome::Admitted
    }
}
