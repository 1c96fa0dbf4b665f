use crate::domain::models::{
    event::{Event, EventCancellation, EventFilter},
    registration::{EventAttendee, Registration},
    ticket::Ticket,
    scanner::EventScanner,
    dashboard::{ActivityKind, ActivityRow, AttendanceTotals, EventTotals, RegistrationTotals},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError>;
    /// DRAFT -> UPCOMING. `None` when the event is not a draft.
    async fn publish(&self, id: &str) -> Result<Option<Event>, AppError>;
    /// Any non-cancelled status -> CANCELLED, together with every CONFIRMED registration
    /// of the event and their tickets, in one transaction. `None` when already cancelled.
    async fn cancel(&self, id: &str, at: DateTime<Utc>) -> Result<Option<EventCancellation>, AppError>;
    /// Atomic check-and-increment of `registered_count`; `false` when nothing was reserved.
    async fn try_reserve_seat(&self, id: &str, now: DateTime<Utc>) -> Result<bool, AppError>;
    async fn release_seat(&self, id: &str) -> Result<(), AppError>;
    async fn advance_statuses(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError>;
    async fn totals_for_creator(&self, creator_id: &str) -> Result<EventTotals, AppError>;
    async fn list_upcoming_for_creator(&self, creator_id: &str, limit: i64) -> Result<Vec<Event>, AppError>;
    async fn recent_activity(&self, kind: ActivityKind, organizer_id: Option<&str>, limit: i64) -> Result<Vec<ActivityRow>, AppError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Fails with `AlreadyRegistered` when a CONFIRMED registration exists for the pair.
    async fn create(&self, registration: &Registration) -> Result<Registration, AppError>;
    /// Removes a registration whose ticket was never issued and gives its seat back.
    async fn discard(&self, registration: &Registration) -> Result<(), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError>;
    async fn find_confirmed(&self, event_id: &str, attendee_id: &str) -> Result<Option<Registration>, AppError>;
    async fn list_confirmed_for_attendee(&self, attendee_id: &str) -> Result<Vec<Registration>, AppError>;
    async fn list_for_event(&self, event_id: &str) -> Result<Vec<EventAttendee>, AppError>;
    /// CONFIRMED -> CANCELLED, releasing the seat and cancelling the ticket in the same
    /// transaction. `None` (and no change) when the registration was not confirmed.
    async fn cancel(&self, id: &str, at: DateTime<Utc>) -> Result<Option<Registration>, AppError>;
    async fn attendance_for_event(&self, event_id: &str) -> Result<AttendanceTotals, AppError>;
    async fn totals_for_creator(&self, creator_id: &str) -> Result<RegistrationTotals, AppError>;
    async fn recent_activity(&self, kind: ActivityKind, organizer_id: Option<&str>, limit: i64) -> Result<Vec<ActivityRow>, AppError>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError>;
    async fn find_by_payload(&self, qr_payload: &str) -> Result<Option<Ticket>, AppError>;
    async fn find_by_registration(&self, registration_id: &str) -> Result<Option<Ticket>, AppError>;
    async fn list_for_attendee(&self, attendee_id: &str) -> Result<Vec<Ticket>, AppError>;
    /// ACTIVE -> USED. `None` when the ticket was not active.
    async fn mark_used(&self, qr_payload: &str, at: DateTime<Utc>) -> Result<Option<Ticket>, AppError>;
}

#[async_trait]
pub trait ScannerRepository: Send + Sync {
    async fn add(&self, scanner: &EventScanner) -> Result<EventScanner, AppError>;
    async fn remove(&self, event_id: &str, scanner_id: &str) -> Result<bool, AppError>;
    async fn list(&self, event_id: &str) -> Result<Vec<EventScanner>, AppError>;
    async fn is_assigned(&self, event_id: &str, scanner_id: &str) -> Result<bool, AppError>;
}
