mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::TestApp;
use eventhub_backend::domain::models::event::{Event, EventStatus, NewEventParams};
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn test_create_event_defaults() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");

    let event = app.create_event(&org, json!({ "tags": ["Tech ", "networking", ""] })).await;

    assert_eq!(event["status"], "UPCOMING");
    assert_eq!(event["registered_count"], 0);
    assert_eq!(event["creator_id"], "org-1");
    assert_eq!(event["tags"], json!(["networking", "tech"]));
    assert!(event["cancelled_at"].is_null());
}

#[tokio::test]
async fn test_create_event_validation() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    let start = Utc::now() + Duration::days(2);

    let cases = vec![
        json!({ "name": "Past", "start_time": (Utc::now() - Duration::hours(1)).to_rfc3339(), "end_time": (Utc::now() + Duration::hours(1)).to_rfc3339(), "capacity": 10 }),
        json!({ "name": "Backwards", "start_time": start.to_rfc3339(), "end_time": (start - Duration::hours(1)).to_rfc3339(), "capacity": 10 }),
        json!({ "name": "Empty", "start_time": start.to_rfc3339(), "end_time": (start + Duration::hours(1)).to_rfc3339(), "capacity": 0 }),
        json!({ "name": "   ", "start_time": start.to_rfc3339(), "end_time": (start + Duration::hours(1)).to_rfc3339(), "capacity": 10 }),
        json!({ "name": "Negative", "start_time": start.to_rfc3339(), "end_time": (start + Duration::hours(1)).to_rfc3339(), "capacity": 10, "price_cents": -1 }),
    ];

    for payload in cases {
        let (status, body) = app.call("POST", "/api/v1/events", Some(&org), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {} was accepted", payload);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_only_organizers_create_events() {
    let app = TestApp::new().await;
    let (_, attendee) = app.attendee("alice");
    let start = Utc::now() + Duration::days(1);

    let payload = json!({
        "name": "Sneaky", "start_time": start.to_rfc3339(),
        "end_time": (start + Duration::hours(1)).to_rfc3339(), "capacity": 5
    });
    let (status, body) = app.call("POST", "/api/v1/events", Some(&attendee), Some(payload)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_authentication_is_required() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/v1/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.call("GET", "/api/v1/events", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_cookie_is_accepted() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    app.create_event(&org, json!({})).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", org))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_unknown_event() {
    let app = TestApp::new().await;
    let (_, attendee) = app.attendee("alice");

    let (status, body) = app.call("GET", "/api/v1/events/does-not-exist", Some(&attendee), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_and_search_events() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    let (_, attendee) = app.attendee("alice");

    app.create_event(&org, json!({ "name": "Tech Conference", "category": "Technology" })).await;
    app.create_event(&org, json!({ "name": "Jazz Night", "category": "Music", "location": "Blue Note" })).await;
    app.create_event(&org, json!({ "name": "Rust Meetup", "category": "Technology", "location": "Online", "is_online": true })).await;

    let (status, all) = app.call("GET", "/api/v1/events", Some(&attendee), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, tech) = app.call("GET", "/api/v1/events?category=technology", Some(&attendee), None).await;
    assert_eq!(tech.as_array().unwrap().len(), 2);

    let (_, jazz) = app.call("GET", "/api/v1/events?q=blue%20NOTE", Some(&attendee), None).await;
    let jazz = jazz.as_array().unwrap();
    assert_eq!(jazz.len(), 1);
    assert_eq!(jazz[0]["name"], "Jazz Night");

    let (_, online) = app.call("GET", "/api/v1/events?online=true", Some(&attendee), None).await;
    let online = online.as_array().unwrap();
    assert_eq!(online.len(), 1);
    assert_eq!(online[0]["name"], "Rust Meetup");

    let (_, in_person) = app.call("GET", "/api/v1/events?online=false&category=Technology", Some(&attendee), None).await;
    assert_eq!(in_person.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_draft_is_hidden_until_published() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    let (_, other_org) = app.organizer("org-2");
    let (_, attendee) = app.attendee("alice");

    let draft = app.create_event(&org, json!({ "name": "Secret Gala", "draft": true })).await;
    let id = draft["id"].as_str().unwrap();
    assert_eq!(draft["status"], "DRAFT");

    let (_, public) = app.call("GET", "/api/v1/events", Some(&attendee), None).await;
    assert!(public.as_array().unwrap().is_empty());

    let (_, mine) = app.call("GET", "/api/v1/events?mine=true", Some(&org), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, _) = app.register(id, &attendee).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call("POST", &format!("/api/v1/events/{}/publish", id), Some(&other_org), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, published) = app.call("POST", &format!("/api/v1/events/{}/publish", id), Some(&org), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["status"], "UPCOMING");

    let (status, body) = app.call("POST", &format!("/api/v1/events/{}/publish", id), Some(&org), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = app.register(id, &attendee).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_cancel_event_rules() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    let (_, other_org) = app.organizer("org-2");
    let (_, attendee) = app.attendee("alice");

    let event = app.create_event(&org, json!({})).await;
    let id = event["id"].as_str().unwrap();
    let uri = format!("/api/v1/events/{}/cancel", id);

    let (status, _) = app.call("POST", &uri, Some(&other_org), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, cancelled) = app.call("POST", &uri, Some(&org), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED");
    assert!(!cancelled["cancelled_at"].is_null());

    let (status, body) = app.call("POST", &uri, Some(&org), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_CANCELLED");

    let (status, body) = app.register(id, &attendee).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

fn past_event(creator: &str, start_offset: Duration, end_offset: Duration) -> Event {
    let now = Utc::now();
    let mut event = Event::new(
        creator.to_string(),
        NewEventParams {
            name: "Already Running".into(),
            description: String::new(),
            start_time: now + Duration::hours(1),
            end_time: now + Duration::hours(2),
            location: "Hall".into(),
            category: "Music".into(),
            tags: Default::default(),
            is_online: false,
            capacity: 10,
            price_cents: 0,
            draft: false,
        },
        now,
    ).unwrap();
    event.start_time = now + start_offset;
    event.end_time = now + end_offset;
    event
}

#[tokio::test]
async fn test_lifecycle_sweep_advances_statuses() {
    let app = TestApp::new().await;
    let repos = app.repos();

    let running = repos.events.create(&past_event("org-1", Duration::hours(-1), Duration::hours(1))).await.unwrap();
    let finished = repos.events.create(&past_event("org-1", Duration::hours(-3), Duration::hours(-1))).await.unwrap();
    let future = repos.events.create(&past_event("org-1", Duration::hours(5), Duration::hours(6))).await.unwrap();

    let moved = app.state.catalog.advance_statuses(Utc::now()).await.unwrap();
    assert_eq!(moved.len(), 2);

    let status_of = |id: String| {
        let repos = app.repos();
        async move { repos.events.find_by_id(&id).await.unwrap().unwrap().status }
    };
    assert_eq!(status_of(running.id.clone()).await, EventStatus::Ongoing);
    assert_eq!(status_of(finished.id.clone()).await, EventStatus::Completed);
    assert_eq!(status_of(future.id.clone()).await, EventStatus::Upcoming);

    // Ongoing events still take registrations; completed ones do not.
    let (_, attendee) = app.attendee("alice");
    let (status, _) = app.register(&running.id, &attendee).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app.register(&finished.id, &attendee).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let again = app.state.catalog.advance_statuses(Utc::now()).await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_unswept_finished_event_rejects_registration() {
    let app = TestApp::new().await;
    let repos = app.repos();
    let stale = repos.events.create(&past_event("org-1", Duration::hours(-3), Duration::hours(-1))).await.unwrap();

    let (_, attendee) = app.attendee("alice");
    let (status, _) = app.call("GET", &format!("/api/v1/events/{}", stale.id), Some(&attendee), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body): (StatusCode, Value) = app.register(&stale.id, &attendee).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_wildcards_in_filters_are_literal() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    let (_, attendee) = app.attendee("alice");

    app.create_event(&org, json!({ "name": "Tech Conference", "category": "Technology" })).await;
    app.create_event(&org, json!({ "name": "100% Jazz", "category": "Music" })).await;

    let (_, any_category) = app.call("GET", "/api/v1/events?category=%25", Some(&attendee), None).await;
    assert!(any_category.as_array().unwrap().is_empty());

    let (_, percent) = app.call("GET", "/api/v1/events?q=%25", Some(&attendee), None).await;
    let percent = percent.as_array().unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0]["name"], "100% Jazz");

    let (_, underscore) = app.call("GET", "/api/v1/events?q=_", Some(&attendee), None).await;
    assert!(underscore.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_other_organizers_draft_is_not_found() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    let (_, other_org) = app.organizer("org-2");
    let (_, attendee) = app.attendee("alice");

    let draft = app.create_event(&org, json!({ "name": "Secret Gala", "draft": true })).await;
    let uri = format!("/api/v1/events/{}", draft["id"].as_str().unwrap());

    for token in [&other_org, &attendee] {
        let (status, body) = app.call("GET", &uri, Some(token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    let (status, own) = app.call("GET", &uri, Some(&org), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["status"], "DRAFT");
}

#[tokio::test]
async fn test_status_filter_uses_current_status() {
    let app = TestApp::new().await;
    let repos = app.repos();
    let (_, attendee) = app.attendee("alice");

    // Stored as UPCOMING, but already started and not yet swept.
    let running = repos.events.create(&past_event("org-1", Duration::hours(-1), Duration::hours(1))).await.unwrap();
    let future = repos.events.create(&past_event("org-1", Duration::hours(5), Duration::hours(6))).await.unwrap();

    let (_, ongoing) = app.call("GET", "/api/v1/events?status=ONGOING", Some(&attendee), None).await;
    let ongoing = ongoing.as_array().unwrap();
    assert_eq!(ongoing.len(), 1);
    assert_eq!(ongoing[0]["id"], running.id.as_str());
    assert_eq!(ongoing[0]["status"], "ONGOING");

    let (_, upcoming) = app.call("GET", "/api/v1/events?status=UPCOMING", Some(&attendee), None).await;
    let upcoming = upcoming.as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["id"], future.id.as_str());
}
