use std::time::Duration;

use crate::reconnect::ReconnectConfig;

/// Default face-detection endpoint.
pub const DEFAULT_DETECT_URL: &str = "https://sg3.akool.com/detect";

/// Default base URL of the open API (swap + quota endpoints).
pub const DEFAULT_API_BASE: &str = "https://openapi.akool.com/api/open/v3";

/// Default push-channel endpoint (the local webhook relay).
pub const DEFAULT_PUSH_URL: &str = "ws://localhost:3008/ws";

/// Default per-request timeout for detection and submission calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer credential passed through to every API call.
    pub api_token: String,
    pub detect_url: String,
    pub api_base: String,
    pub push_url: String,
    /// Address the service calls back when a job changes status. Only
    /// needed to submit jobs; see [`ClientConfig::webhook_url`].
    pub webhook_url: Option<String>,
    pub request_timeout: Duration,
    pub reconnect: ReconnectConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                                  |
    /// |---------------------------------|------------------------------------------|
    /// | `FACESWAP_API_TOKEN`            | required                                 |
    /// | `FACESWAP_DETECT_URL`           | `https://sg3.akool.com/detect`           |
    /// | `FACESWAP_API_BASE`             | `https://openapi.akool.com/api/open/v3`  |
    /// | `FACESWAP_PUSH_URL`             | `ws://localhost:3008/ws`                 |
    /// | `FACESWAP_WEBHOOK_URL`          | required to submit jobs                  |
    /// | `FACESWAP_REQUEST_TIMEOUT_SECS` | `30`                                     |
    /// | `FACESWAP_RECONNECT_ATTEMPTS`   | `5` (`0` retries forever)                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.into());

        let api_token = required("FACESWAP_API_TOKEN")?;
        let webhook_url = required("FACESWAP_WEBHOOK_URL").ok();

        let timeout_raw = or_default(
            "FACESWAP_REQUEST_TIMEOUT_SECS",
            &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
        );
        let timeout_secs: u64 = timeout_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "FACESWAP_REQUEST_TIMEOUT_SECS",
            expected: "a whole number of seconds",
            value: timeout_raw.clone(),
        })?;

        let mut reconnect = ReconnectConfig::default();
        if let Some(raw) = lookup("FACESWAP_RECONNECT_ATTEMPTS") {
            let attempts: u32 = raw.parse().map_err(|_| ConfigError::Invalid {
                name: "FACESWAP_RECONNECT_ATTEMPTS",
                expected: "a non-negative integer",
                value: raw.clone(),
            })?;
            reconnect.max_attempts = (attempts > 0).then_some(attempts);
        }

        Ok(Self {
            api_token,
            detect_url: or_default("FACESWAP_DETECT_URL", DEFAULT_DETECT_URL),
            api_base: or_default("FACESWAP_API_BASE", DEFAULT_API_BASE),
            push_url: or_default("FACESWAP_PUSH_URL", DEFAULT_PUSH_URL),
            webhook_url,
            request_timeout: Duration::from_secs(timeout_secs),
            reconnect,
        })
    }

    /// The webhook address, required before any job is submitted.
    pub fn webhook_url(&self) -> Result<&str, ConfigError> {
        self.webhook_url
            .as_deref()
            .ok_or(ConfigError::Missing("FACESWAP_WEBHOOK_URL"))
    }
}
