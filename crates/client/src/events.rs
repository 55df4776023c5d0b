//! Events emitted by the notification channel to its subscriber.

use faceswap_core::status::StatusEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The WebSocket connection was (re-)established.
    Connected,

    /// The connection dropped; a reconnect is already under way.
    Disconnected,

    /// A status update for the active job.
    Status(StatusEvent),

    /// Reconnection attempts were exhausted. No further events follow.
    Lost { attempts: u32 },
}
