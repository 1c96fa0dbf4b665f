use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthPrincipal;
use crate::api::dtos::requests::{ActivityQuery, UpcomingQuery};
use crate::domain::models::principal::Principal;
use crate::domain::services::dashboard::DEFAULT_UPCOMING_LIMIT;
use crate::error::AppError;
use std::sync::Arc;

const DEFAULT_ACTIVITY_LIMIT: usize = 10;

fn require_organizer(principal: &Principal) -> Result<(), AppError> {
    if !principal.is_organizer() {
        return Err(AppError::Forbidden("Dashboard is only available to organizers".into()));
    }
    Ok(())
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
) -> Result<impl IntoResponse, AppError> {
    require_organizer(&principal)?;
    let stats = state.dashboard.stats_for_organizer(&principal.id).await?;
    Ok(Json(stats))
}

pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(query): Query<ActivityQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_organizer(&principal)?;
    let organizer = query.mine.then_some(principal.id.as_str());
    let activity = state.dashboard
        .recent_activity(query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT), organizer)
        .await?;
    Ok(Json(activity))
}

pub async fn get_upcoming(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(query): Query<UpcomingQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_organizer(&principal)?;
    let limit = query.limit.unwrap_or(DEFAULT_UPCOMING_LIMIT).clamp(1, 50);
    let events = state.dashboard.upcoming_events(&principal.id, limit).await?;
    Ok(Json(events))
}

pub async fn get_event_performance(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_organizer(&principal)?;
    let performance = state.dashboard.event_performance(&event_id, &principal).await?;
    Ok(Json(performance))
}
