//! Detection and request-staging stage of a swap job.
//!
//! Runs both face detections (target first, then source), validates that
//! each found a face, and assembles the [`SwapJobRequest`] to submit.

use faceswap_client::service::SwapService;
use faceswap_core::encoding::to_embedded;
use faceswap_core::job::JobKind;
use faceswap_core::types::{
    DetectionResult, FaceTarget, ImageReference, ModifyTarget, SwapJobRequest,
};

use crate::error::{JobError, StartError};

/// Message used when either image has no detectable face.
pub const NO_FACE_MESSAGE: &str = "No face landmarks detected in one or both images";

/// Inputs of an image swap.
#[derive(Debug, Clone)]
pub struct ImageSwapInput {
    pub target: ImageReference,
    pub source: ImageReference,
    pub single_face: bool,
    pub enhance: bool,
}

/// Inputs of a video swap. All media must be externally addressable.
#[derive(Debug, Clone)]
pub struct VideoSwapInput {
    pub target: String,
    pub source: String,
    pub video: String,
    pub enhance: bool,
}

#[derive(Debug, Clone)]
pub enum JobInput {
    Image(ImageSwapInput),
    Video(VideoSwapInput),
}

impl JobInput {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Image(_) => JobKind::Image,
            Self::Video(_) => JobKind::Video,
        }
    }

    /// Reject empty inputs before any call is made.
    pub fn validate(&self) -> Result<(), StartError> {
        let empty_ref = |r: &ImageReference| match r {
            ImageReference::Url(url) => url.trim().is_empty(),
            ImageReference::Binary(bytes) => bytes.is_empty(),
        };
        match self {
            Self::Image(input) if empty_ref(&input.target) || empty_ref(&input.source) => Err(
                StartError::InvalidRequest("Both a target and a source image are required".into()),
            ),
            Self::Video(input)
                if [&input.target, &input.source, &input.video]
                    .iter()
                    .any(|s| s.trim().is_empty()) =>
            {
                Err(StartError::InvalidRequest(
                    "Target image, source image and target video are all required".into(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Detect faces in both images and build the swap request.
pub async fn prepare_request(
    service: &dyn SwapService,
    input: &JobInput,
    callback_address: &str,
) -> Result<SwapJobRequest, JobError> {
    match input {
        JobInput::Image(input) => prepare_image(service, input, callback_address).await,
        JobInput::Video(input) => prepare_video(service, input, callback_address).await,
    }
}

async fn prepare_image(
    service: &dyn SwapService,
    input: &ImageSwapInput,
    callback_address: &str,
) -> Result<SwapJobRequest, JobError> {
    let target_result = service
        .detect(&input.target, input.single_face, input.enhance)
        .await?;
    let source_result = service
        .detect(&input.source, input.single_face, input.enhance)
        .await?;

    let (target_opts, source_opts) = require_landmarks(&target_result, &source_result)?;

    let target_path = wire_path(&input.target);
    let source_path = wire_path(&input.source);

    Ok(SwapJobRequest {
        source: FaceTarget {
            path: source_path,
            opts: source_opts,
        },
        target: FaceTarget {
            path: target_path.clone(),
            opts: target_opts,
        },
        enhance_face: input.enhance,
        modify_target: ModifyTarget::Image(target_path),
        callback_address: callback_address.to_string(),
    })
}

/// The video path always detects with `single_face = false`, whatever
/// the caller's preference; the service expects multi-face landmarks for
/// video swaps.
async fn prepare_video(
    service: &dyn SwapService,
    input: &VideoSwapInput,
    callback_address: &str,
) -> Result<SwapJobRequest, JobError> {
    let source_result = service
        .detect(&ImageReference::Url(input.source.clone()), false, false)
        .await?;
    let target_result = service
        .detect(&ImageReference::Url(input.target.clone()), false, false)
        .await?;

    let (target_opts, source_opts) = require_landmarks(&target_result, &source_result)?;

    Ok(SwapJobRequest {
        source: FaceTarget {
            path: input.source.clone(),
            opts: source_opts,
        },
        target: FaceTarget {
            path: input.target.clone(),
            opts: target_opts,
        },
        enhance_face: input.enhance,
        modify_target: ModifyTarget::Video(input.video.clone()),
        callback_address: callback_address.to_string(),
    })
}

fn require_landmarks(
    target: &DetectionResult,
    source: &DetectionResult,
) -> Result<(String, String), JobError> {
    match (&target.landmarks, &source.landmarks) {
        (Some(t), Some(s)) => Ok((t.clone(), s.clone())),
        _ => Err(JobError::Validation(NO_FACE_MESSAGE.to_string())),
    }
}

/// Path to send for an image: its URL, or the bytes embedded as a data
/// URI. A location reported by detection is not reused for uploads.
fn wire_path(image: &ImageReference) -> String {
    match image {
        ImageReference::Url(url) => url.clone(),
        ImageReference::Binary(bytes) => to_embedded(bytes),
    }
}
