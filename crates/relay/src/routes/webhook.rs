//! Inbound webhook from the face-swap service.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::crypto::WebhookCipher;
use crate::error::WebhookError;
use crate::events::{StatusUpdate, EVENT_FACESWAP_STATUS, EVENT_MESSAGE};
use crate::state::AppState;

/// Body posted by the service. Only `dataEncrypt` is used; the signing
/// fields are accepted but not verified.
#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(rename = "dataEncrypt")]
    data_encrypt: Option<String>,
    #[allow(dead_code)]
    signature: Option<String>,
    #[allow(dead_code)]
    timestamp: Option<Value>,
    #[allow(dead_code)]
    nonce: Option<Value>,
}

/// Decrypt a webhook body into the status update to broadcast.
pub fn decode_webhook(cipher: &WebhookCipher, body: &[u8]) -> Result<StatusUpdate, WebhookError> {
    let body: WebhookBody = serde_json::from_slice(body).map_err(WebhookError::Body)?;
    let ciphertext = body
        .data_encrypt
        .filter(|d| !d.is_empty())
        .ok_or(WebhookError::MissingCiphertext)?;

    let plain = cipher.decrypt(&ciphertext)?;
    let payload: Value = serde_json::from_str(&plain).map_err(WebhookError::Payload)?;

    let status = payload
        .get("status")
        .and_then(|s| s.as_i64().or_else(|| s.as_str()?.trim().parse().ok()))
        .ok_or(WebhookError::MissingStatus)?;

    Ok(StatusUpdate::from_webhook(status, payload))
}

/// POST /api/webhook
async fn receive_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    tracing::info!(bytes = body.len(), "Webhook received");

    match decode_webhook(&state.cipher, &body) {
        Ok(update) => {
            tracing::info!(
                status = ?update.status,
                message = %update.message,
                "Webhook decoded",
            );
            state
                .ws_manager
                .publish(EVENT_FACESWAP_STATUS, &update)
                .await;
            Json(json!({
                "success": true,
                "message": "Webhook processed successfully",
            }))
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Webhook rejected");
            if e.is_broadcast() {
                state
                    .ws_manager
                    .publish(
                        EVENT_FACESWAP_STATUS,
                        StatusUpdate::processing_error(&e.to_string()),
                    )
                    .await;
            }
            e.into_response()
        }
    }
}

/// GET /test-app -- push a test message to every subscriber.
async fn test_app(State(state): State<AppState>) -> Json<Value> {
    state
        .ws_manager
        .publish(EVENT_MESSAGE, json!({ "data": "Hello, World!" }))
        .await;
    Json(json!({ "message": "Hello, World!" }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/webhook", post(receive_webhook))
        .route("/test-app", get(test_app))
}
