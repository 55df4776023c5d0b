//! WebSocket client for the push-notification endpoint.
//!
//! [`PushClient`] holds the endpoint address. Call
//! [`PushClient::connect`] to establish a live [`PushConnection`].

use tokio_tungstenite::{connect_async, MaybeTlsStream};

/// The raw stream type of an established push connection.
pub type PushStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Configuration handle for the push endpoint.
#[derive(Debug, Clone)]
pub struct PushClient {
    url: String,
}

/// A live WebSocket connection to the push endpoint.
pub struct PushConnection {
    /// Endpoint the connection was made to.
    pub url: String,
    /// The raw WebSocket stream for reading/writing frames.
    pub ws_stream: PushStream,
}

impl PushClient {
    /// * `url` - WebSocket URL, e.g. `ws://localhost:3008/ws`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the WebSocket connection.
    pub async fn connect(&self) -> Result<PushConnection, ChannelError> {
        let (ws_stream, _response) = connect_async(self.url.as_str()).await.map_err(|e| {
            ChannelError::Connection(format!("Failed to connect to {}: {e}", self.url))
        })?;

        tracing::debug!(url = %self.url, "WebSocket handshake complete");

        Ok(PushConnection {
            url: self.url.clone(),
            ws_stream,
        })
    }
}

/// Errors that can occur on the push channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Failed to establish the WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A protocol-level error on an already-established connection.
    #[error("Protocol error: {0}")]
    Protocol(String),
}
