//! Request-side data model shared by the detection and submission clients.

use serde::Serialize;

/// An image handed to the pipeline, either by address or by content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// Externally addressable image (`http(s)://...`).
    Url(String),
    /// Raw file contents. Must be embedded before it goes on the wire.
    Binary(Vec<u8>),
}

impl ImageReference {
    /// The URL when this reference is externally addressable.
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Binary(_) => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}

/// Outcome of a face-detection call for one image.
///
/// `landmarks == None` means no face was found. That is a valid result,
/// not an error; callers must check it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetectionResult {
    /// Service-encoded landmark data for the first detected face.
    pub landmarks: Option<String>,
    /// Location where the service stored the uploaded image, if any.
    pub resolved_location: Option<String>,
    /// Number of faces reported by the service.
    pub face_count: usize,
}

impl DetectionResult {
    pub fn has_face(&self) -> bool {
        self.landmarks.is_some()
    }
}

/// One side (source or target) of a swap request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaceTarget {
    /// URL or data URI of the image.
    pub path: String,
    /// Landmark data returned by detection for that image.
    pub opts: String,
}

/// The media the swap is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifyTarget {
    Image(String),
    Video(String),
}

/// A single swap submission. Built fresh per job and consumed on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapJobRequest {
    pub source: FaceTarget,
    pub target: FaceTarget,
    pub enhance_face: bool,
    pub modify_target: ModifyTarget,
    /// Webhook the service calls when the job changes status.
    pub callback_address: String,
}

impl SwapJobRequest {
    pub fn is_video(&self) -> bool {
        matches!(self.modify_target, ModifyTarget::Video(_))
    }
}
