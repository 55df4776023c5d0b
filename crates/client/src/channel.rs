//! Long-lived, reconnecting notification channel.
//!
//! [`NotificationChannel::start`] spawns a connection task (connect ->
//! process -> reconnect loop) and hands back a [`ChannelEvents`] stream
//! for the single subscriber. Dropping or shutting down the channel
//! cancels the task and closes the socket; a local teardown never
//! triggers a reconnect.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::PushClient;
use crate::events::ChannelEvent;
use crate::processor::{process_frames, SessionEnd};
use crate::reconnect::{reconnect_loop, ReconnectConfig, ReconnectError};

/// How long [`NotificationChannel::shutdown`] waits for the task to exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the running channel task. Scoped: dropping it tears the
/// channel down.
pub struct NotificationChannel {
    cancel: CancellationToken,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

/// Stream of [`ChannelEvent`]s. Ends after local teardown or after
/// [`ChannelEvent::Lost`].
pub struct ChannelEvents {
    rx: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl NotificationChannel {
    /// Spawn the connection task for `client`.
    pub fn start(client: PushClient, config: ReconnectConfig) -> (Self, ChannelEvents) {
        let (event_tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task_handle = tokio::spawn(async move {
            tracing::info!(url = %client.url(), "Starting notification channel");
            run_connection_loop(&client, &config, &event_tx, &task_cancel).await;
            tracing::info!(url = %client.url(), "Notification channel task exited");
        });

        let channel = Self {
            cancel,
            task_handle: Some(task_handle),
        };
        (channel, ChannelEvents { rx })
    }

    /// `true` until the channel has been torn down.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
            && self
                .task_handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Close the channel and wait (bounded) for the task to exit.
    pub async fn shutdown(mut self) {
        tracing::info!("Shutting down notification channel");
        self.cancel.cancel();
        if let Some(handle) = self.task_handle.take() {
            if tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await.is_err() {
                tracing::warn!("Notification channel task did not exit in time");
            }
        }
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl ChannelEvents {
    /// Receive the next event, or `None` once the channel has ended.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.rx.recv().await
    }
}

impl Stream for ChannelEvents {
    type Item = ChannelEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Core connection loop: connect -> process frames -> reconnect.
///
/// Runs until the cancellation token fires or reconnection is exhausted.
async fn run_connection_loop(
    client: &PushClient,
    config: &ReconnectConfig,
    event_tx: &mpsc::UnboundedSender<ChannelEvent>,
    cancel: &CancellationToken,
) {
    loop {
        let conn = match reconnect_loop(client, config, cancel).await {
            Ok(conn) => conn,
            Err(ReconnectError::Cancelled) => return,
            Err(ReconnectError::Exhausted { attempts }) => {
                let _ = event_tx.send(ChannelEvent::Lost { attempts });
                return;
            }
        };
        let _ = event_tx.send(ChannelEvent::Connected);

        let mut ws_stream = conn.ws_stream;
        let end = process_frames(&mut ws_stream, event_tx, cancel).await;

        if !end.should_reconnect() || cancel.is_cancelled() {
            return;
        }

        if let SessionEnd::ReceiveError(e) = &end {
            tracing::warn!(error = %e, "Push channel dropped");
        }
        let _ = event_tx.send(ChannelEvent::Disconnected);
        tracing::info!(url = %client.url(), "Connection lost, reconnecting");
    }
}
