use crate::domain::models::{registration::{BulkOutcome, Registration}, ticket::Ticket};
use serde::Serialize;

#[derive(Serialize)]
pub struct RegistrationCreatedResponse {
    pub registration: Registration,
    pub ticket: Ticket,
}

#[derive(Serialize)]
pub struct BulkRegisterResponse {
    pub admitted: usize,
    pub results: Vec<BulkOutcome>,
}
