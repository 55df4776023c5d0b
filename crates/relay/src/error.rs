use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::crypto::CryptoError;

/// Why an incoming webhook could not be turned into a status event.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Invalid JSON body: {0}")]
    Body(#[source] serde_json::Error),

    #[error("Missing dataEncrypt in body")]
    MissingCiphertext,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("Decrypted payload is not JSON: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("Missing status in payload")]
    MissingStatus,
}

impl WebhookError {
    /// Whether subscribers are told about this failure.
    ///
    /// A payload without a status is answered quietly; every other
    /// failure is also broadcast as an error event.
    pub fn is_broadcast(&self) -> bool {
        !matches!(self, Self::MissingStatus)
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.to_string() });
        (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
    }
}
