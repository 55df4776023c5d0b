//! End-to-end: a webhook posted to the relay reaches a subscribed
//! notification channel as a typed status event.

mod common;

use std::time::Duration;

use faceswap_client::channel::NotificationChannel;
use faceswap_client::client::PushClient;
use faceswap_client::events::ChannelEvent;
use faceswap_client::reconnect::ReconnectConfig;
use faceswap_core::status::{EventKind, StatusCode};
use faceswap_relay::state::AppState;
use serde_json::json;

const WAIT: Duration = Duration::from_secs(5);

async fn serve_relay() -> (AppState, axum::Router, String) {
    let (state, app) = common::build_test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let served = app.clone();
    tokio::spawn(async move {
        axum::serve(listener, served).await.unwrap();
    });
    (state, app, format!("ws://{addr}/ws"))
}

async fn wait_for_subscribers(state: &AppState, n: usize) {
    tokio::time::timeout(WAIT, async {
        while state.ws_manager.subscriber_count().await < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber never registered");
}

async fn next_status(events: &mut faceswap_client::channel::ChannelEvents) -> ChannelEvent {
    loop {
        let event = tokio::time::timeout(WAIT, events.recv())
            .await
            .expect("timed out waiting for channel event")
            .expect("channel ended");
        if matches!(event, ChannelEvent::Status(_)) {
            return event;
        }
    }
}

#[tokio::test]
async fn webhook_reaches_subscriber() {
    let (state, app, url) = serve_relay().await;
    let (channel, mut events) =
        NotificationChannel::start(PushClient::new(url), ReconnectConfig::default());
    wait_for_subscribers(&state, 1).await;

    let payload = json!({"status": 3, "url": "https://cdn/r.mp4"});
    let response = common::post_json(
        app,
        "/api/webhook",
        &json!({"dataEncrypt": common::encrypt(&payload.to_string())}),
    )
    .await;
    assert!(response.status().is_success());

    match next_status(&mut events).await {
        ChannelEvent::Status(event) => {
            assert_eq!(event.status, Some(StatusCode::Succeeded));
            assert_eq!(event.kind, EventKind::Info);
            assert_eq!(event.message, "Processing completed");
            assert_eq!(event.artifact_url.as_deref(), Some("https://cdn/r.mp4"));
        }
        other => panic!("unexpected event {other:?}"),
    }

    channel.shutdown().await;
}

#[tokio::test]
async fn processing_error_reaches_subscriber_as_error() {
    let (state, app, url) = serve_relay().await;
    let (channel, mut events) =
        NotificationChannel::start(PushClient::new(url), ReconnectConfig::default());
    wait_for_subscribers(&state, 1).await;

    let response =
        common::post_json(app, "/api/webhook", &json!({"dataEncrypt": "AAAA"})).await;
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);

    match next_status(&mut events).await {
        ChannelEvent::Status(event) => {
            assert!(event.is_error());
            assert_eq!(event.status, None);
            assert!(event.message.starts_with("Error processing webhook: "));
        }
        other => panic!("unexpected event {other:?}"),
    }

    channel.shutdown().await;
}
