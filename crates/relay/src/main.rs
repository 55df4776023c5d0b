//! `faceswap-relay` -- decrypts face-swap webhooks and pushes the status
//! events to WebSocket subscribers.
//!
//! # Environment variables
//!
//! | Variable        | Required | Default   |
//! |-----------------|----------|-----------|
//! | `CLIENT_ID`     | yes      | --        |
//! | `CLIENT_SECRET` | yes      | --        |
//! | `HOST`          | no       | `0.0.0.0` |
//! | `PORT`          | no       | `3008`    |
//! | `CORS_ORIGINS`  | no       | `*`       |

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faceswap_relay::app::{build_app, build_cors_layer};
use faceswap_relay::config::RelayConfig;
use faceswap_relay::crypto::WebhookCipher;
use faceswap_relay::state::AppState;
use faceswap_relay::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faceswap_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = RelayConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid relay configuration");
        std::process::exit(1);
    });
    tracing::info!(host = %config.host, port = config.port, "Loaded relay configuration");

    let cipher = WebhookCipher::new(&config.client_id, &config.client_secret).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid webhook credentials");
        std::process::exit(1);
    });

    let cors = build_cors_layer(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid CORS_ORIGINS");
        std::process::exit(1);
    });

    // --- State ---
    let state = AppState::new(cipher);
    let ws_manager = Arc::clone(&state.ws_manager);
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    let app = build_app(state, cors);

    // --- Start server ---
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(host = %config.host, error = %e, "Invalid HOST address");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "Relay listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    // --- Post-shutdown cleanup ---
    let ws_count = ws_manager.subscriber_count().await;
    tracing::info!(ws_count, "Closing remaining subscriber connections");
    ws_manager.close_all().await;

    heartbeat_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
