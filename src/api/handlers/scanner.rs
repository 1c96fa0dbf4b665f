use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthPrincipal;
use crate::api::dtos::requests::AddScannerRequest;
use crate::error::AppError;
use std::sync::Arc;

pub async fn add_scanner(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(event_id): Path<String>,
    Json(payload): Json<AddScannerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let scanner = state.catalog.add_scanner(&event_id, &principal, &payload.scanner_id).await?;
    Ok((StatusCode::CREATED, Json(scanner)))
}

pub async fn list_scanners(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let scanners = state.catalog.list_scanners(&event_id, &principal).await?;
    Ok(Json(scanners))
}

pub async fn remove_scanner(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path((event_id, scanner_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog.remove_scanner(&event_id, &principal, &scanner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
