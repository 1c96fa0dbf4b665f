use std::sync::Arc;
use chrono::Utc;
use tracing::{info, warn};

use crate::domain::models::{
    principal::Principal,
    registration::Registration,
    ticket::{ScanOutcome, Ticket, TicketStatus},
};
use crate::domain::ports::TicketRepository;
use crate::domain::services::catalog::EventCatalog;
use crate::domain::services::retry::{retry_transient, RetryPolicy};
use crate::error::AppError;

pub struct TicketIssuer {
    tickets: Arc<dyn TicketRepository>,
    catalog: Arc<EventCatalog>,
    retry: RetryPolicy,
}

impl TicketIssuer {
    pub fn new(tickets: Arc<dyn TicketRepository>, catalog: Arc<EventCatalog>, retry: RetryPolicy) -> Self {
        Self { tickets, catalog, retry }
    }

    pub async fn issue_ticket(&self, registration: &Registration) -> Result<Ticket, AppError> {
        let ticket = Ticket::issue(
            registration.id.clone(),
            registration.event_id.clone(),
            registration.attendee_id.clone(),
        );
        let issued = self.tickets.create(&ticket).await?;
        info!(ticket_id = %issued.id, registration_id = %registration.id, "Ticket issued");
        Ok(issued)
    }

    /// Checks a presented QR payload and consumes the ticket when it is still active.
    /// Of several concurrent scans of one ticket exactly one sees `Valid`.
    pub async fn validate_scan(&self, qr_payload: &str, principal: &Principal) -> Result<ScanOutcome, AppError> {
        if !principal.may_scan_at_all() {
            return Err(AppError::Forbidden("Attendees cannot validate tickets".into()));
        }

        let found = retry_transient(self.retry, "find_ticket", move || self.tickets.find_by_payload(qr_payload)).await?;
        let Some(ticket) = found else {
            return Ok(ScanOutcome::NotFound);
        };

        let event = self.catalog.get_event(&ticket.event_id).await?;
        if !self.catalog.may_scan(&event, principal).await? {
            return Err(AppError::Forbidden("Not assigned to scan tickets for this event".into()));
        }

        let outcome = match ticket.status {
            TicketStatus::Used => ScanOutcome::AlreadyUsed(ticket),
            TicketStatus::Cancelled => ScanOutcome::Cancelled(ticket),
            TicketStatus::Active => match self.tickets.mark_used(qr_payload, Utc::now()).await? {
                Some(used) => ScanOutcome::Valid(used),
                // Someone else moved it first; report what it became.
                None => match self.tickets.find_by_payload(qr_payload).await? {
                    Some(t) if t.status == TicketStatus::Cancelled => ScanOutcome::Cancelled(t),
                    Some(t) => ScanOutcome::AlreadyUsed(t),
                    None => ScanOutcome::NotFound,
                },
            },
        };

        match &outcome {
            ScanOutcome::Valid(t) => info!(ticket_id = %t.id, scanner_id = %principal.id, "Ticket admitted"),
            ScanOutcome::AlreadyUsed(t) => warn!(ticket_id = %t.id, scanner_id = %principal.id, "Ticket presented again"),
            ScanOutcome::Cancelled(t) => warn!(ticket_id = %t.id, scanner_id = %principal.id, "Cancelled ticket presented"),
            ScanOutcome::NotFound => {}
        }
        Ok(outcome)
    }

    pub async fn get_by_registration(&self, registration_id: &str, principal: &Principal) -> Result<Ticket, AppError> {
        let ticket = retry_transient(self.retry, "find_ticket_by_registration", move || {
            self.tickets.find_by_registration(registration_id)
        }).await?
            .ok_or_else(|| AppError::NotFound(format!("No ticket for registration {}", registration_id)))?;

        if ticket.attendee_id != principal.id {
            let event = self.catalog.get_event(&ticket.event_id).await?;
            if !event.is_owned_by(&principal.id) {
                return Err(AppError::Forbidden("Not your ticket".into()));
            }
        }
        Ok(ticket)
    }

    pub async fn list_for_attendee(&self, attendee_id: &str) -> Result<Vec<Ticket>, AppError> {
        retry_transient(self.retry, "list_tickets", move || self.tickets.list_for_attendee(attendee_id)).await
    }
}
