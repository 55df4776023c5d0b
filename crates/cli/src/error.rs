use faceswap_client::api::ApiError;
use faceswap_client::config::ConfigError;
use faceswap_core::error::EncodingError;
use faceswap_pipeline::error::{DownloadError, StartError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Could not start job: {0}")]
    Start(#[from] StartError),

    #[error(transparent)]
    Input(#[from] EncodingError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The job ended in failure; the reason was already shown.
    #[error("Swap job failed")]
    JobFailed,

    #[error("Interrupted")]
    Interrupted,
}
