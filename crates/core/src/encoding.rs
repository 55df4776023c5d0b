//! Embedding of local images as `data:` URIs.
//!
//! The detection and swap endpoints accept either a URL or an inline
//! base64 payload. Local files are converted here before they are sent.

use std::path::Path;

use base64::Engine;

use crate::error::EncodingError;

/// MIME type used when the content cannot be identified.
const FALLBACK_MIME: &str = "application/octet-stream";

/// Encode raw image bytes as a self-describing data URI.
///
/// Deterministic: the same bytes always yield the same string.
pub fn to_embedded(bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{encoded}", sniff_mime(bytes))
}

/// Read the raw bytes of a local image. Empty files are rejected.
pub async fn read_image(path: impl AsRef<Path>) -> Result<Vec<u8>, EncodingError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| EncodingError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if bytes.is_empty() {
        return Err(EncodingError::Empty);
    }
    Ok(bytes)
}

/// Read an image file and encode it with [`to_embedded`].
pub async fn read_embedded(path: impl AsRef<Path>) -> Result<String, EncodingError> {
    let bytes = read_image(path).await?;
    Ok(to_embedded(&bytes))
}

/// Identify common image formats from their magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        _ => FALLBACK_MIME,
    }
}
