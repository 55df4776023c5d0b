use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

/// Interval between subscriber pings.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ping every subscriber each [`HEARTBEAT_INTERVAL`] until aborted.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let pinged = ws_manager.ping_all().await;
            if pinged > 0 {
                tracing::debug!(pinged, "Subscriber heartbeat");
            }
        }
    })
}
