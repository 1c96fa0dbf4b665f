use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, event, scanner, registration, ticket, dashboard};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Events
        .route("/api/v1/events", post(event::create_event).get(event::list_events))
        .route("/api/v1/events/{event_id}", get(event::get_event))
        .route("/api/v1/events/{event_id}/publish", post(event::publish_event))
        .route("/api/v1/events/{event_id}/cancel", post(event::cancel_event))

        // Scanners
        .route("/api/v1/events/{event_id}/scanners", get(scanner::list_scanners).post(scanner::add_scanner))
        .route("/api/v1/events/{event_id}/scanners/{scanner_id}", delete(scanner::remove_scanner))

        // Registrations
        .route("/api/v1/events/{event_id}/registrations", post(registration::register).get(registration::list_event_registrations))
        .route("/api/v1/events/{event_id}/registrations/bulk", post(registration::bulk_register))
        .route("/api/v1/registrations/mine", get(registration::list_my_registrations))
        .route("/api/v1/registrations/{registration_id}", get(registration::get_registration))
        .route("/api/v1/registrations/{registration_id}/cancel", post(registration::cancel_registration))
        .route("/api/v1/registrations/{registration_id}/ticket", get(ticket::get_registration_ticket))

        // Tickets
        .route("/api/v1/tickets/mine", get(ticket::list_my_tickets))
        .route("/api/v1/tickets/scan", post(ticket::scan_ticket))

        // Dashboard
        .route("/api/v1/dashboard/stats", get(dashboard::get_stats))
        .route("/api/v1/dashboard/activity", get(dashboard::get_activity))
        .route("/api/v1/dashboard/upcoming", get(dashboard::get_upcoming))
        .route("/api/v1/dashboard/events/{event_id}", get(dashboard::get_event_performance))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        principal_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
