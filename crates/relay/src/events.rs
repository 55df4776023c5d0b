//! Events the relay pushes to connected clients.
//!
//! Every frame is a JSON text message `{"event": "<name>", "data": {...}}`.

use faceswap_core::status::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

/// Event name of job status updates.
pub const EVENT_FACESWAP_STATUS: &str = "faceswap_status";

/// Event name of informational messages.
pub const EVENT_MESSAGE: &str = "message";

/// Wire envelope of a pushed event.
#[derive(Debug, Serialize)]
pub struct PushFrame<'a, T: Serialize> {
    pub event: &'a str,
    pub data: T,
}

impl<'a, T: Serialize> PushFrame<'a, T> {
    pub fn new(event: &'a str, data: T) -> Self {
        Self { event, data }
    }

    pub fn to_text(&self) -> String {
        // Infallible for string keys.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Payload of a `faceswap_status` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl StatusUpdate {
    /// Build the update for a decrypted webhook payload with a `status`.
    ///
    /// Status 4 is reported as an `error` event; everything else is a
    /// `status_update`. The decrypted payload travels along as `data`.
    pub fn from_webhook(status: i64, payload: Value) -> Self {
        let code = StatusCode::from_code(status);
        Self {
            kind: if code == StatusCode::Failed {
                "error"
            } else {
                "status_update"
            },
            status: Some(status),
            message: code.description().to_string(),
            data: Some(payload),
        }
    }

    /// Build the update broadcast when a webhook could not be processed.
    pub fn processing_error(error: &str) -> Self {
        Self {
            kind: "error",
            status: None,
            message: format!("Error processing webhook: {error}"),
            data: None,
        }
    }
}

/// Greeting sent to each client right after it connects.
pub fn greeting() -> Value {
    json!({ "data": "Connected to server", "type": "info" })
}
