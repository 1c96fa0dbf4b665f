mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn setup_with_ticket(app: &TestApp) -> (String, String, String) {
    let (_, org) = app.organizer("org-1");
    let (_, alice) = app.attendee("alice");

    let event = app.create_event(&org, json!({ "capacity": 10 })).await;
    let event_id = event["id"].as_str().unwrap().to_string();
    let (_, reg) = app.register(&event_id, &alice).await;
    let payload = reg["ticket"]["qr_payload"].as_str().unwrap().to_string();
    (org, event_id, payload)
}

async fn scan(app: &TestApp, token: &str, payload: &str) -> (StatusCode, Value) {
    app.call("POST", "/api/v1/tickets/scan", Some(token), Some(json!({ "qr_payload": payload }))).await
}

#[tokio::test]
async fn test_scan_admits_once() {
    let app = TestApp::new().await;
    let (org, _, payload) = setup_with_ticket(&app).await;

    let (status, first) = scan(&app, &org, &payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["result"], "VALID");
    assert_eq!(first["ticket"]["status"], "USED");
    assert!(!first["ticket"]["used_at"].is_null());

    let (status, second) = scan(&app, &org, &payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["result"], "ALREADY_USED");
}

#[tokio::test]
async fn test_scan_unknown_payload() {
    let app = TestApp::new().await;
    let (_, scanner) = app.scanner("door-1");

    let (status, body) = scan(&app, &scanner, "deadbeef").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "NOT_FOUND");
    assert!(body.get("ticket").is_none());
}

#[tokio::test]
async fn test_scan_of_cancelled_registration() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    let (_, bob) = app.attendee("bob");

    let event = app.create_event(&org, json!({})).await;
    let (_, reg) = app.register(event["id"].as_str().unwrap(), &bob).await;
    let reg_id = reg["registration"]["id"].as_str().unwrap();
    let payload = reg["ticket"]["qr_payload"].as_str().unwrap();

    app.call("POST", &format!("/api/v1/registrations/{}/cancel", reg_id), Some(&bob), None).await;

    let (status, body) = scan(&app, &org, payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "CANCELLED");
}

#[tokio::test]
async fn test_scanner_assignment_controls_scanning() {
    let app = TestApp::new().await;
    let (org, event_id, payload) = setup_with_ticket(&app).await;
    let (_, door) = app.scanner("door-1");
    let (_, alice) = app.attendee("alice");

    let (status, body) = scan(&app, &alice, &payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = scan(&app, &door, &payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let scanners_uri = format!("/api/v1/events/{}/scanners", event_id);
    let (status, added) = app.call("POST", &scanners_uri, Some(&org), Some(json!({ "scanner_id": "door-1" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["scanner_id"], "door-1");

    let (status, body) = app.call("POST", &scanners_uri, Some(&org), Some(json!({ "scanner_id": "door-1" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = app.call("GET", &scanners_uri, Some(&door), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, list) = app.call("GET", &scanners_uri, Some(&org), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, body) = scan(&app, &door, &payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "VALID");

    let (status, _) = app.call("DELETE", &format!("{}/door-1", scanners_uri), Some(&org), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call("DELETE", &format!("{}/door-1", scanners_uri), Some(&org), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = scan(&app, &door, &payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ticket_lookups() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    let (_, alice) = app.attendee("alice");
    let (_, mallory) = app.attendee("mallory");

    let first = app.create_event(&org, json!({ "name": "First" })).await;
    let second = app.create_event(&org, json!({ "name": "Second" })).await;
    let (_, reg) = app.register(first["id"].as_str().unwrap(), &alice).await;
    app.register(second["id"].as_str().unwrap(), &alice).await;

    let reg_id = reg["registration"]["id"].as_str().unwrap();
    let uri = format!("/api/v1/registrations/{}/ticket", reg_id);

    let (status, ticket) = app.call("GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket["qr_payload"], reg["ticket"]["qr_payload"]);

    let (status, _) = app.call("GET", &uri, Some(&org), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call("GET", &uri, Some(&mallory), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, tickets) = app.call("GET", "/api/v1/tickets/mine", Some(&alice), None).await;
    assert_eq!(tickets.as_array().unwrap().len(), 2);

    let (_, none) = app.call("GET", "/api/v1/tickets/mine", Some(&mallory), None).await;
    assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_used_ticket_is_void_after_cancel() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    let (_, alice) = app.attendee("alice");

    let event = app.create_event(&org, json!({ "capacity": 3 })).await;
    let (_, reg) = app.register(event["id"].as_str().unwrap(), &alice).await;
    let reg_id = reg["registration"]["id"].as_str().unwrap();
    let payload = reg["ticket"]["qr_payload"].as_str().unwrap();

    let (_, first) = scan(&app, &org, payload).await;
    assert_eq!(first["result"], "VALID");

    let (status, _) = app.call("POST", &format!("/api/v1/registrations/{}/cancel", reg_id), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, ticket) = app.call("GET", &format!("/api/v1/registrations/{}/ticket", reg_id), Some(&alice), None).await;
    assert_eq!(ticket["status"], "CANCELLED");
    assert!(!ticket["used_at"].is_null());

    let (status, rescan) = scan(&app, &org, payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rescan["result"], "CANCELLED");
}

#[tokio::test]
async fn test_attendee_list_shows_check_in() {
    let app = TestApp::new().await;
    let (_, org) = app.organizer("org-1");
    let (_, alice) = app.attendee("alice");
    let (_, bob) = app.attendee("bob");

    let event = app.create_event(&org, json!({})).await;
    let event_id = event["id"].as_str().unwrap();
    let (_, a) = app.register(event_id, &alice).await;
    app.register(event_id, &bob).await;

    scan(&app, &org, a["ticket"]["qr_payload"].as_str().unwrap()).await;

    let (status, attendees) = app.call("GET", &format!("/api/v1/events/{}/registrations", event_id), Some(&org), None).await;
    assert_eq!(status, StatusCode::OK);
    let attendees = attendees.as_array().unwrap();
    assert_eq!(attendees.len(), 2);

    let alice_row = attendees.iter().find(|r| r["attendee_id"] == "alice").unwrap();
    assert_eq!(alice_row["status"], "CONFIRMED");
    assert_eq!(alice_row["ticket_status"], "USED");
    assert!(!alice_row["checked_in_at"].is_null());

    let bob_row = attendees.iter().find(|r| r["attendee_id"] == "bob").unwrap();
    assert_eq!(bob_row["ticket_status"], "ACTIVE");
    assert!(bob_row["checked_in_at"].is_null());
}
