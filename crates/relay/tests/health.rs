//! Integration tests for the health check and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let (_state, app) = common::build_test_app();
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["connections"], 0);
}

// ---------------------------------------------------------------------------
// Test: health reports registered subscribers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_counts_connections() {
    let (state, app) = common::build_test_app();
    let _rx1 = state.ws_manager.subscribe_as("a".into()).await;
    let _rx2 = state.ws_manager.subscribe_as("b".into()).await;

    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["connections"], 2);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (_state, app) = common::build_test_app();
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
