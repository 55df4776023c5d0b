use faceswap_client::api::ApiError;
use faceswap_core::job::JobState;

/// Why a job stage failed. The display text is what the user sees.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Local validation failed (e.g. no face found), nothing was submitted.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Why a new job could not be started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    /// Another job is still in flight.
    #[error("A swap job is already in progress ({0})")]
    JobInProgress(JobState),

    /// The push channel gave up; results could no longer be received.
    #[error("Notification channel lost; no job result can be received")]
    ChannelLost,

    /// The controller task has shut down.
    #[error("Job controller is not running")]
    ControllerStopped,

    /// The request is missing an input.
    #[error("{0}")]
    InvalidRequest(String),
}

/// Errors while saving a finished artifact locally.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Download failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Artifact server returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
