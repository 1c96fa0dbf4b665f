use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthPrincipal;
use crate::api::dtos::requests::ScanRequest;
use crate::error::AppError;
use std::sync::Arc;

pub async fn get_registration_ticket(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(registration_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = state.tickets.get_by_registration(&registration_id, &principal).await?;
    Ok(Json(ticket))
}

pub async fn list_my_tickets(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let tickets = state.tickets.list_for_attendee(&principal.id).await?;
    Ok(Json(tickets))
}

/// Always 200 for a permitted scan; the body's `result` says what happened.
pub async fn scan_ticket(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(payload): Json<ScanRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.tickets.validate_scan(payload.qr_payload.trim(), &principal).await?;
    Ok(Json(outcome))
}
