//! Save a finished artifact to local storage.

use std::path::{Path, PathBuf};

use faceswap_core::artifact::ResolvedArtifact;

use crate::error::DownloadError;

/// Fetch `artifact` and write it into `dir` under the default file name
/// for its kind (`face-swap-result.png` or `face-swap-result.mp4`).
///
/// Returns the path of the written file. An existing file is replaced.
pub async fn download_artifact(
    client: &reqwest::Client,
    artifact: &ResolvedArtifact,
    dir: &Path,
) -> Result<PathBuf, DownloadError> {
    let response = client.get(&artifact.url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus(status.as_u16()));
    }

    let bytes = response.bytes().await?;
    let path = dir.join(artifact.kind.default_file_name());

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| DownloadError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "Artifact saved");
    Ok(path)
}
