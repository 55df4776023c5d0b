//! Status events pushed by the notification relay.
//!
//! The relay forwards the face-swap service's webhook as
//! `{"type": "...", "status": n, "message": "...", "data": {...}}`.
//! [`StatusEvent`] is the typed view of that payload.

use serde::Deserialize;

/// Numeric job status as reported by the face-swap service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 1: accepted and queued.
    Queued,
    /// 2: in progress.
    Processing,
    /// 3: finished with an artifact.
    Succeeded,
    /// 4: finished without an artifact.
    Failed,
    /// Any value the service has not documented.
    Other(i64),
}

impl StatusCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Queued,
            2 => Self::Processing,
            3 => Self::Succeeded,
            4 => Self::Failed,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Queued => 1,
            Self::Processing => 2,
            Self::Succeeded => 3,
            Self::Failed => 4,
            Self::Other(code) => code,
        }
    }

    /// `true` while the job is still running (codes 1 and 2).
    ///
    /// Every other code, including undocumented ones, ends the busy
    /// indicator.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Queued | Self::Processing)
    }

    /// Human-readable text the relay attaches to each code.
    pub fn description(self) -> &'static str {
        match self {
            Self::Queued => "Processing started",
            Self::Processing => "Processing in progress",
            Self::Succeeded => "Processing completed",
            Self::Failed => "Processing failed",
            Self::Other(_) => "Unknown status",
        }
    }
}

/// Whether the event reports a failure or is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Error,
    Info,
}

/// A status notification for the active job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawStatusEvent")]
pub struct StatusEvent {
    /// `None` for relay-side errors, which carry no service status.
    pub status: Option<StatusCode>,
    pub message: String,
    pub artifact_url: Option<String>,
    pub kind: EventKind,
}

impl StatusEvent {
    pub fn is_error(&self) -> bool {
        self.kind == EventKind::Error
    }

    /// `true` when the event carries a status outside {1, 2}.
    pub fn is_terminal(&self) -> bool {
        self.status.is_some_and(|s| !s.is_running())
    }
}

/// Wire shape of a `faceswap_status` payload.
#[derive(Debug, Deserialize)]
struct RawStatusEvent {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl From<RawStatusEvent> for StatusEvent {
    fn from(raw: RawStatusEvent) -> Self {
        let status = raw.status.map(StatusCode::from_code);
        let kind = match raw.kind.as_deref() {
            Some("error") => EventKind::Error,
            _ => EventKind::Info,
        };
        let artifact_url = raw
            .data
            .as_ref()
            .and_then(|d| d.get("url"))
            .and_then(|u| u.as_str())
            .filter(|u| !u.is_empty())
            .map(str::to_owned);
        let message = raw.message.unwrap_or_else(|| {
            status
                .map(StatusCode::description)
                .unwrap_or_default()
                .to_string()
        });

        Self {
            status,
            message,
            artifact_url,
            kind,
        }
    }
}
