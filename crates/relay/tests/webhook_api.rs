//! Integration tests for `POST /api/webhook` and `GET /test-app`.
//!
//! A subscriber is registered directly on the `WsManager` so each test can
//! observe what the relay broadcasts.

mod common;

use axum::extract::ws::Message;
use axum::http::StatusCode;
use common::{body_json, encrypt, get, post_json, post_raw};
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;

fn frame(msg: Message) -> Value {
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

async fn subscribe(state: &faceswap_relay::state::AppState) -> UnboundedReceiver<Message> {
    state.ws_manager.subscribe_as("subscriber".into()).await
}

// ---------------------------------------------------------------------------
// Test: a valid webhook is acknowledged and broadcast
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completed_webhook_is_broadcast() {
    let (state, app) = common::build_test_app();
    let mut rx = subscribe(&state).await;

    let payload = json!({"status": 3, "url": "https://cdn/r.png", "_id": "job-1"});
    let response = post_json(
        app,
        "/api/webhook",
        &json!({"dataEncrypt": encrypt(&payload.to_string()), "signature": "sig", "timestamp": 1, "nonce": "n"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "message": "Webhook processed successfully"})
    );

    let pushed = frame(rx.try_recv().unwrap());
    assert_eq!(pushed["event"], "faceswap_status");
    assert_eq!(pushed["data"]["type"], "status_update");
    assert_eq!(pushed["data"]["status"], 3);
    assert_eq!(pushed["data"]["message"], "Processing completed");
    assert_eq!(pushed["data"]["data"], payload);
}

// ---------------------------------------------------------------------------
// Test: status 4 is pushed as an error event
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_status_is_error_event() {
    let (state, app) = common::build_test_app();
    let mut rx = subscribe(&state).await;

    let response = post_json(
        app,
        "/api/webhook",
        &json!({"dataEncrypt": encrypt(r#"{"status":4}"#)}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let pushed = frame(rx.try_recv().unwrap());
    assert_eq!(pushed["data"]["type"], "error");
    assert_eq!(pushed["data"]["message"], "Processing failed");
}

// ---------------------------------------------------------------------------
// Test: payload without status is rejected without broadcast
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_status_returns_400_quietly() {
    let (state, app) = common::build_test_app();
    let mut rx = subscribe(&state).await;

    let response = post_json(
        app,
        "/api/webhook",
        &json!({"dataEncrypt": encrypt(r#"{"url":"https://cdn/r.png"}"#)}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Missing status in payload"})
    );
    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: undecryptable payload is rejected and broadcast as an error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_ciphertext_is_broadcast_as_error() {
    let (state, app) = common::build_test_app();
    let mut rx = subscribe(&state).await;

    let response = post_json(app, "/api/webhook", &json!({"dataEncrypt": "not base64!"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("base64"));

    let pushed = frame(rx.try_recv().unwrap());
    assert_eq!(pushed["event"], "faceswap_status");
    assert_eq!(pushed["data"]["type"], "error");
    assert!(pushed["data"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Error processing webhook: "));
}

// ---------------------------------------------------------------------------
// Test: malformed and incomplete bodies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_json_body_returns_400() {
    let (state, app) = common::build_test_app();
    let mut rx = subscribe(&state).await;

    let response = post_raw(app, "/api/webhook", "{{{").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_ok());
}

#[tokio::test]
async fn missing_ciphertext_returns_400() {
    let (_state, app) = common::build_test_app();

    let response = post_json(app, "/api/webhook", &json!({"signature": "x"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Missing dataEncrypt in body"})
    );
}

// ---------------------------------------------------------------------------
// Test: GET /test-app broadcasts a message event
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_app_broadcasts_message() {
    let (state, app) = common::build_test_app();
    let mut rx = subscribe(&state).await;

    let response = get(app, "/test-app").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"message": "Hello, World!"}));
    assert_eq!(
        frame(rx.try_recv().unwrap()),
        json!({"event": "message", "data": {"data": "Hello, World!"}})
    );
}
