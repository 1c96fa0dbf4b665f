use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthPrincipal;
use crate::api::dtos::requests::{CreateEventRequest, ListEventsQuery};
use crate::domain::models::event::EventFilter;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Creating event: {}", payload.name);
    let event = state.catalog.create_event(&principal, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(query): Query<ListEventsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = EventFilter {
        category: query.category.filter(|c| !c.trim().is_empty()),
        q: query.q.filter(|q| !q.trim().is_empty()),
        online: query.online,
        status: query.status,
        creator_id: query.mine.then(|| principal.id.clone()),
    };
    let events = state.catalog.list_events(&filter).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.catalog.get_visible_event(&event_id, &principal).await?;
    Ok(Json(event))
}

pub async fn publish_event(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.catalog.publish_event(&event_id, &principal).await?;
    Ok(Json(event))
}

pub async fn cancel_event(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("Cancelling event: {}", event_id);
    let event = state.catalog.cancel_event(&event_id, &principal).await?;
    Ok(Json(event))
}
