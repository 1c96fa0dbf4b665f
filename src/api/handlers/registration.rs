use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthPrincipal;
use crate::api::dtos::{
    requests::BulkRegisterRequest,
    responses::{BulkRegisterResponse, RegistrationCreatedResponse},
};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn register(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("Registering {} for event {}", principal.id, event_id);
    let (registration, ticket) = state.ledger.register(&event_id, &principal).await?;
    Ok((StatusCode::CREATED, Json(RegistrationCreatedResponse { registration, ticket })))
}

pub async fn bulk_register(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(event_id): Path<String>,
    Json(payload): Json<BulkRegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.attendee_ids.is_empty() {
        return Err(AppError::Validation("attendee_ids must not be empty".into()));
    }
    let results = state.ledger.bulk_register(&event_id, &principal, &payload.attendee_ids).await?;
    let admitted = results.iter().filter(|r| r.error.is_none()).count();
    Ok(Json(BulkRegisterResponse { admitted, results }))
}

pub async fn list_event_registrations(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registrations = state.ledger.list_for_event(&event_id, &principal).await?;
    Ok(Json(registrations))
}

pub async fn list_my_registrations(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let registrations = state.ledger.list_for_attendee(&principal.id).await?;
    Ok(Json(registrations))
}

pub async fn get_registration(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(registration_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registration = state.ledger.get_registration(&registration_id, &principal).await?;
    Ok(Json(registration))
}

pub async fn cancel_registration(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(registration_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("Cancelling registration: {}", registration_id);
    let registration = state.ledger.cancel(&registration_id, &principal).await?;
    Ok(Json(registration))
}
