//! End-to-end tests for the HTTP trigger.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use common::TestApp;
use shopcrm_core::types::id::AppointmentId;
use shopcrm_entity::appointment::ReminderKind;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_run_reminders_at_clock_time() {
    let app = TestApp::new();
    let appt = app
        .seed_appointment(Duration::hours(23) + Duration::minutes(50))
        .await;

    let response = app.request("POST", "/api/reminders/run", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["candidates"], 1);
    assert_eq!(data["dispatched"], 1);
    assert_eq!(data["appointments"][0]["appointment_id"], appt.id.to_string());
    assert_eq!(data["appointments"][0]["sent"], json!(["24h"]));
    assert_eq!(data["appointments"][0]["failed"], json!([]));

    let stored = app.store.appointment(appt.id).await.unwrap();
    assert!(stored.has_sent(ReminderKind::DayBefore));
}

#[tokio::test]
async fn test_run_reminders_with_explicit_now() {
    let app = TestApp::new();
    app.seed_appointment(Duration::hours(30)).await;

    let early = app
        .request(
            "POST",
            "/api/reminders/run",
            Some(json!({ "now": app.now.to_rfc3339() })),
        )
        .await;
    let later = app
        .request(
            "POST",
            "/api/reminders/run",
            Some(json!({ "now": (app.now + Duration::hours(7)).to_rfc3339() })),
        )
        .await;

    assert_eq!(early.body["data"]["candidates"], 0);
    assert_eq!(later.body["data"]["dispatched"], 1);
    assert_eq!(app.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_run_reminders_rejects_bad_body() {
    let app = TestApp::new();

    let malformed = app
        .request("POST", "/api/reminders/run", Some(json!({ "now": "soon" })))
        .await;
    let far_away = app
        .request(
            "POST",
            "/api/reminders/run",
            Some(json!({ "now": "1999-01-01T00:00:00Z" })),
        )
        .await;

    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["error"], "VALIDATION_ERROR");
    assert_eq!(far_away.status, StatusCode::BAD_REQUEST);
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_confirmation_dispatches_every_call() {
    let app = TestApp::new();
    let appt = app.seed_appointment(Duration::days(4)).await;
    let path = format!("/api/appointments/{}/confirmation", appt.id);

    let first = app.request("POST", &path, None).await;
    let second = app.request("POST", &path, None).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.body["data"]["success"], true);
    assert_eq!(first.body["data"]["appointment_id"], appt.id.to_string());
    assert_eq!(app.notifier.sent().len(), 2);
}

#[tokio::test]
async fn test_confirmation_unknown_appointment() {
    let app = TestApp::new();
    let path = format!("/api/appointments/{}/confirmation", AppointmentId::new());

    let response = app.request("POST", &path, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
    assert_eq!(app.notifier.attempts(), 0);
}

#[tokio::test]
async fn test_confirmation_malformed_id() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/api/appointments/not-a-uuid/confirmation", None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
