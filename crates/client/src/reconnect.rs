//! Exponential-backoff reconnection for the push channel.
//!
//! [`reconnect_loop`] keeps retrying [`PushClient::connect`] with growing
//! delays until the connection is restored, the attempt budget runs out,
//! or the [`CancellationToken`] is triggered.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{PushClient, PushConnection};

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Attempts allowed per outage. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_attempts: Some(5),
        }
    }
}

/// Why [`reconnect_loop`] gave up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconnectError {
    #[error("Reconnect cancelled")]
    Cancelled,

    #[error("Gave up after {attempts} reconnect attempts")]
    Exhausted { attempts: u32 },
}

impl ReconnectConfig {
    /// Delay to wait after `current`: grown by the multiplier, capped at
    /// `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier).min(self.max_delay)
    }

    /// `true` once `attempts` failures have used up the budget.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Connect to the push endpoint, retrying with exponential backoff.
///
/// The first attempt is made immediately. Returns the connection once one
/// succeeds.
pub async fn reconnect_loop(
    client: &PushClient,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Result<PushConnection, ReconnectError> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        tracing::info!(
            url = %client.url(),
            attempt,
            "Connecting to push channel",
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(url = %client.url(), "Reconnect cancelled");
                return Err(ReconnectError::Cancelled);
            }
            result = client.connect() => {
                match result {
                    Ok(conn) => {
                        tracing::info!(url = %client.url(), attempt, "Push channel connected");
                        return Ok(conn);
                    }
                    Err(e) => {
                        tracing::warn!(
                            url = %client.url(),
                            error = %e,
                            "Connect attempt {attempt} failed",
                        );
                    }
                }
            }
        }

        if config.is_exhausted(attempt) {
            tracing::error!(url = %client.url(), attempts = attempt, "Giving up on push channel");
            return Err(ReconnectError::Exhausted { attempts: attempt });
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(ReconnectError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        delay = config.next_delay(delay);
    }
}
