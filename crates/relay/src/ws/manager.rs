use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::ws::Message;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

use crate::events::PushFrame;

/// Outbound queue of one subscriber.
pub type SubscriberRx = mpsc::UnboundedReceiver<Message>;

struct Subscriber {
    tx: mpsc::UnboundedSender<Message>,
    since: Instant,
}

/// A registered subscriber: its id and the frames queued for it.
pub struct Subscription {
    pub id: String,
    pub rx: SubscriberRx,
}

/// Registry of connected notification subscribers.
///
/// Shared via `Arc` between the webhook route, the upgrade handler and
/// the heartbeat. Every subscriber receives every published event.
#[derive(Default)]
pub struct WsManager {
    subscribers: RwLock<HashMap<String, Subscriber>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber under a fresh id.
    pub async fn subscribe(&self) -> Subscription {
        let id = uuid::Uuid::new_v4().to_string();
        let rx = self.subscribe_as(id.clone()).await;
        Subscription { id, rx }
    }

    /// Register a subscriber under `id`, replacing any previous one.
    pub async fn subscribe_as(&self, id: String) -> SubscriberRx {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscriber = Subscriber {
            tx,
            since: Instant::now(),
        };
        self.subscribers.write().await.insert(id, subscriber);
        rx
    }

    /// Drop a subscriber. Returns how long it was connected.
    pub async fn unsubscribe(&self, id: &str) -> Option<Duration> {
        let removed = self.subscribers.write().await.remove(id)?;
        Some(removed.since.elapsed())
    }

    /// Publish a named event to every subscriber as a text frame.
    ///
    /// Returns how many subscribers the frame was queued for. Subscribers
    /// whose queue is closed are skipped; their handler unsubscribes them.
    pub async fn publish<T: Serialize>(&self, event: &str, data: T) -> usize {
        let frame = Message::Text(PushFrame::new(event, data).to_text().into());
        let delivered = self.send_all(frame).await;
        tracing::debug!(event, delivered, "Published event");
        delivered
    }

    /// Queue a named event for one subscriber.
    ///
    /// Returns `false` if the subscriber is unknown or gone.
    pub async fn send_to<T: Serialize>(&self, id: &str, event: &str, data: T) -> bool {
        let frame = Message::Text(PushFrame::new(event, data).to_text().into());
        self.subscribers
            .read()
            .await
            .get(id)
            .is_some_and(|s| s.tx.send(frame).is_ok())
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Queue a Ping for every subscriber.
    pub async fn ping_all(&self) -> usize {
        self.send_all(Message::Ping(Bytes::new())).await
    }

    /// Queue a Close for every subscriber and forget them all.
    pub async fn close_all(&self) {
        let mut subscribers = self.subscribers.write().await;
        for subscriber in subscribers.values() {
            let _ = subscriber.tx.send(Message::Close(None));
        }
        tracing::info!(count = subscribers.len(), "Closed all subscribers");
        subscribers.clear();
    }

    async fn send_all(&self, message: Message) -> usize {
        self.subscribers
            .read()
            .await
            .values()
            .filter(|s| s.tx.send(message.clone()).is_ok())
            .count()
    }
}
