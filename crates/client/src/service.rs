//! Trait seam between the job pipeline and the remote service.

use async_trait::async_trait;
use faceswap_core::types::{DetectionResult, ImageReference, SwapJobRequest};

use crate::api::{ApiError, FaceSwapApi, SubmissionAck};

/// The request/response calls a swap job needs.
///
/// Implemented by [`FaceSwapApi`]; the pipeline only depends on this
/// trait so it can be driven by a stand-in service.
#[async_trait]
pub trait SwapService: Send + Sync {
    async fn detect(
        &self,
        image: &ImageReference,
        single_face: bool,
        enhance: bool,
    ) -> Result<DetectionResult, ApiError>;

    async fn submit_image_swap(&self, request: SwapJobRequest) -> Result<SubmissionAck, ApiError>;

    async fn submit_video_swap(&self, request: SwapJobRequest) -> Result<SubmissionAck, ApiError>;
}

#[async_trait]
impl SwapService for FaceSwapApi {
    async fn detect(
        &self,
        image: &ImageReference,
        single_face: bool,
        enhance: bool,
    ) -> Result<DetectionResult, ApiError> {
        FaceSwapApi::detect(self, image, single_face, enhance).await
    }

    async fn submit_image_swap(&self, request: SwapJobRequest) -> Result<SubmissionAck, ApiError> {
        FaceSwapApi::submit_image_swap(self, request).await
    }

    async fn submit_video_swap(&self, request: SwapJobRequest) -> Result<SubmissionAck, ApiError> {
        FaceSwapApi::submit_video_swap(self, request).await
    }
}
