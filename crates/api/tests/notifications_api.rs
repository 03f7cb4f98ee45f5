//! Integration tests for the `/api/notifications` routes.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, get, send};
use sensorhub_events::{NotificationEvent, NotificationType, Priority};
use serde_json::json;

fn status(message: &str) -> NotificationEvent {
    NotificationEvent::new(NotificationType::SystemStatus, message)
}

// ---------------------------------------------------------------------------
// Test: List is newest first with wire field names
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_newest_first() {
    let (app, state) = common::build_test_app();
    state.dispatcher.notify(status("A"));
    state.dispatcher.notify(status("B").with_priority(Priority::High).silent());

    let json = body_json(get(app, "/api/notifications").await).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["message"], "B");
    assert_eq!(data[0]["priority"], "high");
    assert_eq!(data[0]["silent"], true);
    assert_eq!(data[1]["message"], "A");
    assert_eq!(data[1]["type"], "system_status");
    assert_eq!(data[1]["read"], false);
}

// ---------------------------------------------------------------------------
// Test: Mark one, mark all, unread count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mark_read_and_read_all() {
    let (app, state) = common::build_test_app();
    let a = state.dispatcher.notify(status("A"));
    state.dispatcher.notify(status("B"));

    let response = send(
        app.clone(),
        Method::POST,
        &format!("/api/notifications/{}/read", a.id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get(app.clone(), "/api/notifications/unread-count").await).await;
    assert_eq!(json["data"]["count"], 1);

    let response = send(app.clone(), Method::POST, "/api/notifications/read-all", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.dispatcher.unread_count(), 0);

    let messages: Vec<String> = state
        .dispatcher
        .notifications()
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(messages, vec!["B", "A"]);
}

#[tokio::test]
async fn mark_unknown_id_returns_404() {
    let (app, _) = common::build_test_app();

    let response = send(app, Method::POST, "/api/notifications/42/read", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: DELETE clears the list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_clears_all() {
    let (app, state) = common::build_test_app();
    state.dispatcher.notify(status("A"));

    let response = send(app, Method::DELETE, "/api/notifications", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(state.dispatcher.notifications().is_empty());
}

// ---------------------------------------------------------------------------
// Test: Sound flag toggles the cue for the next alert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sound_toggle_gates_the_next_cue() {
    let common::TestState { state, sink } = common::build_test_state();
    let app = common::router_for(&state);

    let response = send(
        app.clone(),
        Method::PUT,
        "/api/notifications/sound",
        Some(json!({"enabled": false})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["enabled"], false);

    let alert = NotificationEvent::new(NotificationType::ThresholdAlert, "too hot")
        .with_priority(Priority::High);
    state.dispatcher.notify(alert.clone());
    assert_eq!(sink.count(), 0);

    send(
        app.clone(),
        Method::PUT,
        "/api/notifications/sound",
        Some(json!({"enabled": true})),
    )
    .await;
    let json = body_json(get(app, "/api/notifications/sound").await).await;
    assert_eq!(json["data"]["enabled"], true);

    state.dispatcher.notify(alert);
    assert_eq!(sink.count(), 1);
}
