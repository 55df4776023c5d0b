//! Push-channel frame processing loop.
//!
//! Reads raw frames from the push connection, parses them into typed
//! [`PushMessage`] variants and forwards status updates to the channel
//! subscriber as [`ChannelEvent`]s.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::client::{ChannelError, PushStream};
use crate::events::ChannelEvent;
use crate::messages::{parse_message, PushMessage};

/// How a processing session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The remote side closed the connection or the stream ended.
    RemoteClosed,
    /// Local teardown was requested; the channel must not reconnect.
    LocalTeardown,
    /// Reading from the socket failed.
    ReceiveError(ChannelError),
}

impl SessionEnd {
    /// `true` when the channel should try to re-establish the connection.
    pub fn should_reconnect(&self) -> bool {
        !matches!(self, Self::LocalTeardown)
    }
}

/// Process frames from a push connection until it closes or `cancel`
/// fires.
pub async fn process_frames(
    ws_stream: &mut PushStream,
    event_tx: &mpsc::UnboundedSender<ChannelEvent>,
    cancel: &CancellationToken,
) -> SessionEnd {
    loop {
        let msg_result = tokio::select! {
            _ = cancel.cancelled() => {
                if let Err(e) = ws_stream.close(None).await {
                    tracing::debug!(error = %e, "Error while closing push channel");
                }
                return SessionEnd::LocalTeardown;
            }
            next = ws_stream.next() => match next {
                Some(result) => result,
                None => {
                    tracing::info!("Push channel stream exhausted");
                    return SessionEnd::RemoteClosed;
                }
            },
        };

        match msg_result {
            Ok(Message::Text(text)) => handle_text_message(&text, event_tx),
            Ok(Message::Binary(_)) => {
                tracing::trace!("Ignoring binary push frame");
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Handled automatically by tungstenite.
            }
            Ok(Message::Close(frame)) => {
                tracing::info!(?frame, "Push channel closed by server");
                return SessionEnd::RemoteClosed;
            }
            Ok(Message::Frame(_)) => {}
            Err(e) => {
                tracing::error!(error = %e, "Push channel receive error");
                return SessionEnd::ReceiveError(ChannelError::Protocol(e.to_string()));
            }
        }
    }
}

/// Dispatch a single text frame.
fn handle_text_message(text: &str, event_tx: &mpsc::UnboundedSender<ChannelEvent>) {
    match parse_message(text) {
        Ok(PushMessage::FaceswapStatus(event)) => {
            tracing::debug!(
                status = ?event.status,
                kind = ?event.kind,
                message = %event.message,
                "Status event received",
            );
            if event_tx.send(ChannelEvent::Status(event)).is_err() {
                tracing::debug!("Status event dropped, subscriber is gone");
            }
        }
        Ok(PushMessage::Message(data)) => {
            tracing::debug!(%data, "Relay message");
        }
        Err(e) => {
            tracing::warn!(error = %e, raw_message = %text, "Failed to parse push message");
        }
    }
}
