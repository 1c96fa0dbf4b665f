use std::sync::Arc;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::domain::models::{
    event::EventStatus,
    principal::Principal,
    registration::{BulkOutcome, EventAttendee, Registration},
    ticket::Ticket,
};
use crate::domain::ports::RegistrationRepository;
use crate::domain::services::catalog::{EventCatalog, ReserveOutcome};
use crate::domain::services::retry::{retry_transient, RetryPolicy};
use crate::domain::services::tickets::TicketIssuer;
use crate::error::AppError;

pub struct RegistrationLedger {
    registrations: Arc<dyn RegistrationRepository>,
    catalog: Arc<EventCatalog>,
    tickets: Arc<TicketIssuer>,
    retry: RetryPolicy,
}

impl RegistrationLedger {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        catalog: Arc<EventCatalog>,
        tickets: Arc<TicketIssuer>,
        retry: RetryPolicy,
    ) -> Self {
        Self { registrations, catalog, tickets, retry }
    }

    /// Registers the caller for an event and hands back the issued ticket.
    pub async fn register(&self, event_id: &str, principal: &Principal) -> Result<(Registration, Ticket), AppError> {
        self.admit(event_id, &principal.id).await
    }

    /// Organizer-driven registration of several attendees. Each one succeeds or fails on its own.
    pub async fn bulk_register(
        &self,
        event_id: &str,
        principal: &Principal,
        attendee_ids: &[String],
    ) -> Result<Vec<BulkOutcome>, AppError> {
        let event = self.catalog.get_event(event_id).await?;
        if !event.is_owned_by(&principal.id) {
            return Err(AppError::Forbidden("Only the event creator can register attendees".into()));
        }

        let mut outcomes = Vec::with_capacity(attendee_ids.len());
        for attendee_id in attendee_ids {
            let attendee_id = attendee_id.trim();
            let outcome = if attendee_id.is_empty() {
                BulkOutcome { attendee_id: String::new(), registration_id: None, error: Some("VALIDATION_ERROR") }
            } else {
                match self.admit(event_id, attendee_id).await {
                    Ok((registration, _)) => BulkOutcome {
                        attendee_id: attendee_id.to_string(),
                        registration_id: Some(registration.id),
                        error: None,
                    },
                    Err(e) if e.is_transient() || matches!(e, AppError::Database(_)) => return Err(e),
                    Err(e) => BulkOutcome {
                        attendee_id: attendee_id.to_string(),
                        registration_id: None,
                        error: Some(e.code()),
                    },
                }
            };
            outcomes.push(outcome);
        }

        let admitted = outcomes.iter().filter(|o| o.error.is_none()).count();
        info!(event_id = %event_id, requested = attendee_ids.len(), admitted, "Bulk registration finished");
        Ok(outcomes)
    }

    pub async fn cancel(&self, registration_id: &str, principal: &Principal) -> Result<Registration, AppError> {
        let registration = self.load_visible(registration_id, principal).await?;
        if !registration.is_confirmed() {
            return Err(AppError::AlreadyCancelled);
        }

        // Registration, seat and ticket change together. A lost race changes nothing.
        let cancelled = self.registrations.cancel(registration_id, Utc::now()).await?
            .ok_or(AppError::AlreadyCancelled)?;

        info!(registration_id = %cancelled.id, event_id = %cancelled.event_id, "Registration cancelled");
        Ok(cancelled)
    }

    pub async fn list_for_attendee(&self, attendee_id: &str) -> Result<Vec<Registration>, AppError> {
        retry_transient(self.retry, "list_registrations_for_attendee", move || {
            self.registrations.list_confirmed_for_attendee(attendee_id)
        }).await
    }

    /// Every registration of the event with its ticket's check-in state. Creator only.
    pub async fn list_for_event(&self, event_id: &str, principal: &Principal) -> Result<Vec<EventAttendee>, AppError> {
        let event = self.catalog.get_event(event_id).await?;
        if !event.is_owned_by(&principal.id) {
            return Err(AppError::Forbidden("Only the event creator can list registrations".into()));
        }
        retry_transient(self.retry, "list_registrations_for_event", move || {
            self.registrations.list_for_event(event_id)
        }).await
    }

    pub async fn get_registration(&self, id: &str, principal: &Principal) -> Result<Registration, AppError> {
        self.load_visible(id, principal).await
    }

    async fn admit(&self, event_id: &str, attendee_id: &str) -> Result<(Registration, Ticket), AppError> {
        let existing = retry_transient(self.retry, "find_confirmed", move || {
            self.registrations.find_confirmed(event_id, attendee_id)
        }).await?;
        if existing.is_some() {
            return Err(AppError::AlreadyRegistered);
        }

        match self.catalog.reserve_capacity(event_id).await? {
            ReserveOutcome::Admitted => {}
            ReserveOutcome::Full => return Err(AppError::EventFull),
            ReserveOutcome::Closed => return Err(AppError::Validation("Event is not open for registration".into())),
            ReserveOutcome::NotFound => return Err(AppError::NotFound(format!("Event {} not found", event_id))),
        }

        let registration = match self.registrations.create(&Registration::new(event_id.to_string(), attendee_id.to_string())).await {
            Ok(r) => r,
            Err(e) => {
                self.release_after_failure(event_id).await;
                return Err(e);
            }
        };

        let ticket = match self.tickets.issue_ticket(&registration).await {
            Ok(t) => t,
            Err(e) => {
                error!(registration_id = %registration.id, "Ticket issuance failed, rolling back registration: {}", e);
                if let Err(discard_err) = self.registrations.discard(&registration).await {
                    error!(registration_id = %registration.id, "Failed to discard orphaned registration: {:?}", discard_err);
                }
                return Err(e);
            }
        };

        // The event may have been cancelled while this admission was in flight.
        let event = match self.catalog.get_event(event_id).await {
            Ok(event) => event,
            Err(e) => {
                warn!(registration_id = %registration.id, "Could not re-check event after issuing ticket, voiding: {}", e);
                self.void(&registration).await;
                return Err(e);
            }
        };
        if event.status == EventStatus::Cancelled {
            warn!(event_id = %event_id, registration_id = %registration.id, "Event cancelled during registration, voiding");
            self.void(&registration).await;
            return Err(AppError::Validation("Event is not open for registration".into()));
        }

        info!(registration_id = %registration.id, event_id = %event_id, attendee_id = %attendee_id, "Registration confirmed");
        Ok((registration, ticket))
    }

    /// Cancels a registration this call created, with its seat and ticket.
    async fn void(&self, registration: &Registration) {
        if let Err(e) = self.registrations.cancel(&registration.id, Utc::now()).await {
            error!(registration_id = %registration.id, "Failed to void registration: {:?}", e);
        }
    }

    async fn release_after_failure(&self, event_id: &str) {
        if let Err(e) = self.catalog.release_capacity(event_id).await {
            error!(event_id = %event_id, "Failed to release reserved capacity: {:?}", e);
        }
    }

    async fn load_visible(&self, id: &str, principal: &Principal) -> Result<Registration, AppError> {
        let registration = retry_transient(self.retry, "find_registration", move || self.registrations.find_by_id(id)).await?
            .ok_or_else(|| AppError::NotFound(format!("Registration {} not found", id)))?;

        if registration.attendee_id != principal.id {
            let event = self.catalog.get_event(&registration.event_id).await?;
            if !event.is_owned_by(&principal.id) {
                return Err(AppError::Forbidden("Not your registration".into()));
            }
        }
        Ok(registration)
    }
}
