//! Push-channel message types and parser.
//!
//! The relay sends JSON text frames shaped
//! `{"event": "<name>", "data": {...}}`. This module deserializes them
//! into a strongly-typed [`PushMessage`] enum.

use faceswap_core::status::StatusEvent;
use serde::Deserialize;

/// All known push-channel events.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum PushMessage {
    /// Status change of the active swap job.
    #[serde(rename = "faceswap_status")]
    FaceswapStatus(StatusEvent),

    /// Free-form relay message, e.g. the greeting sent on connect.
    #[serde(rename = "message")]
    Message(serde_json::Value),
}

/// Parse a push-channel text frame into a typed enum.
///
/// Returns `Err` for malformed JSON or unknown `event` values.
/// Callers should log and continue.
pub fn parse_message(text: &str) -> Result<PushMessage, serde_json::Error> {
    serde_json::from_str(text)
}
