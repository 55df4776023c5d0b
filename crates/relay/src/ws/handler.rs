use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};

use crate::events::{greeting, EVENT_MESSAGE};
use crate::state::AppState;
use crate::ws::manager::{SubscriberRx, WsManager};

/// GET /ws -- upgrade to a subscriber connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_subscriber(socket, state.ws_manager))
}

/// Serve one subscriber until it disconnects.
///
/// The socket is split: a spawned task drains the subscriber's queue into
/// the sink, while this task reads inbound frames to notice the close.
async fn serve_subscriber(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let subscription = ws_manager.subscribe().await;
    let id = subscription.id;
    tracing::info!(subscriber = %id, "Subscriber connected");

    ws_manager.send_to(&id, EVENT_MESSAGE, greeting()).await;

    let (sink, mut stream) = socket.split();
    let forward = tokio::spawn(forward_queue(id.clone(), subscription.rx, sink));

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => tracing::trace!(subscriber = %id, "Pong"),
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(subscriber = %id, error = %e, "Subscriber read failed");
                break;
            }
        }
    }

    let connected_for = ws_manager.unsubscribe(&id).await;
    forward.abort();
    tracing::info!(subscriber = %id, ?connected_for, "Subscriber disconnected");
}

/// Write queued frames to the socket until the queue closes, a Close
/// frame has been sent, or the socket fails.
async fn forward_queue(
    id: String,
    mut rx: SubscriberRx,
    mut sink: SplitSink<WebSocket, Message>,
) {
    while let Some(frame) = rx.recv().await {
        let is_close = matches!(frame, Message::Close(_));
        if let Err(e) = sink.send(frame).await {
            tracing::debug!(subscriber = %id, error = %e, "Subscriber write failed");
            return;
        }
        if is_close {
            return;
        }
    }
}
