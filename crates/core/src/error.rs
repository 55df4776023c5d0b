use std::path::PathBuf;

/// Errors raised while turning a local image into an embeddable string.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("Failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image data is empty")]
    Empty,
}
