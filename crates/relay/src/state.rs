use std::sync::Arc;

use crate::crypto::WebhookCipher;
use crate::ws::WsManager;

/// Shared state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Subscriber connections.
    pub ws_manager: Arc<WsManager>,
    /// Webhook payload decryption.
    pub cipher: Arc<WebhookCipher>,
}

impl AppState {
    pub fn new(cipher: WebhookCipher) -> Self {
        Self {
            ws_manager: Arc::new(WsManager::new()),
            cipher: Arc::new(cipher),
        }
    }
}
