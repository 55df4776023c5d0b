//! Classification of a finished job's artifact URL.
//!
//! The decision is purely syntactic: the extension of the URL path is
//! compared against a fixed list of video containers. A server that
//! returns a video under any other extension is reported as an image.

use serde::Serialize;

/// Path extensions (lowercase) that identify a video artifact.
pub const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "avi", "wmv", "flv", "mkv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Image,
    Video,
}

impl ArtifactKind {
    /// File name used when the artifact is saved locally.
    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Image => "face-swap-result.png",
            Self::Video => "face-swap-result.mp4",
        }
    }
}

/// The terminal value handed to the display collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArtifact {
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub url: String,
}

/// Classify an artifact URL as image or video.
pub fn classify(url: &str) -> ResolvedArtifact {
    let kind = match path_extension(url) {
        Some(ext) if VIDEO_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(ext)) => {
            ArtifactKind::Video
        }
        _ => ArtifactKind::Image,
    };

    ResolvedArtifact {
        kind,
        url: url.to_string(),
    }
}

/// Extension of the last path segment, ignoring query and fragment.
fn path_extension(url: &str) -> Option<&str> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}
