//! REST client for the face-swap service.
//!
//! Wraps face detection, image/video swap submission and the quota
//! lookup using [`reqwest`]. None of the calls retry; retry policy
//! belongs to the caller.

use faceswap_core::encoding::to_embedded;
use faceswap_core::types::{DetectionResult, ImageReference, ModifyTarget, SwapJobRequest};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

/// Application-level success code used by the open API envelope.
const API_SUCCESS_CODE: i64 = 1000;

/// HTTP client for the face-swap service.
#[derive(Clone)]
pub struct FaceSwapApi {
    client: reqwest::Client,
    token: String,
    detect_url: String,
    api_base: String,
}

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The bearer credential was rejected (HTTP 401/403).
    #[error("Authentication rejected ({status}): {body}")]
    Auth {
        status: u16,
        body: String,
    },

    /// Any other non-2xx status, or an application-level error code.
    #[error("Service error ({status}): {body}")]
    Service {
        status: u16,
        body: String,
    },

    /// A 2xx response whose body could not be understood.
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Acknowledgment of an accepted swap job. Not the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAck {
    /// Service-side job identifier, when the service returns one.
    pub job_id: Option<String>,
    pub message: String,
}

/// Remaining account credit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quota {
    pub credit: f64,
}

// ---- wire types ----

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    single_face: bool,
    face_enhance: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

/// `landmarks_str` is a string for single-face detection and an array
/// for multi-face detection.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LandmarksField {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    landmarks_str: Option<LandmarksField>,
    #[serde(default)]
    origin_url: Option<String>,
}

impl From<DetectResponse> for DetectionResult {
    fn from(resp: DetectResponse) -> Self {
        let (landmarks, face_count) = match resp.landmarks_str {
            Some(LandmarksField::One(s)) if !s.is_empty() => (Some(s), 1),
            Some(LandmarksField::Many(list)) => {
                let count = list.len();
                (list.into_iter().find(|s| !s.is_empty()), count)
            }
            _ => (None, 0),
        };
        Self {
            landmarks,
            resolved_location: resp.origin_url.filter(|u| !u.is_empty()),
            face_count,
        }
    }
}

#[derive(Debug, Serialize)]
struct SwapPayload<'a> {
    #[serde(rename = "sourceImage")]
    source_image: [&'a faceswap_core::types::FaceTarget; 1],
    #[serde(rename = "targetImage")]
    target_image: [&'a faceswap_core::types::FaceTarget; 1],
    face_enhance: u8,
    #[serde(rename = "modifyImage", skip_serializing_if = "Option::is_none")]
    modify_image: Option<&'a str>,
    #[serde(rename = "modifyVideo", skip_serializing_if = "Option::is_none")]
    modify_video: Option<&'a str>,
    #[serde(rename = "webhookUrl")]
    webhook_url: &'a str,
}

impl<'a> SwapPayload<'a> {
    fn from_request(request: &'a SwapJobRequest) -> Self {
        let (modify_image, modify_video) = match &request.modify_target {
            ModifyTarget::Image(path) => (Some(path.as_str()), None),
            ModifyTarget::Video(url) => (None, Some(url.as_str())),
        };
        Self {
            source_image: [&request.source],
            target_image: [&request.target],
            face_enhance: u8::from(request.enhance_face),
            modify_image,
            modify_video,
            webhook_url: &request.callback_address,
        }
    }
}

/// `{code, msg, data}` envelope returned by the open API.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl FaceSwapApi {
    /// Build a client with the configured credential, endpoints and
    /// request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(
            client,
            config.api_token.clone(),
            config.detect_url.clone(),
            config.api_base.clone(),
        ))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        token: String,
        detect_url: String,
        api_base: String,
    ) -> Self {
        Self {
            client,
            token,
            detect_url,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Run face detection on one image.
    ///
    /// No face is not an error: the result has `landmarks == None`.
    pub async fn detect(
        &self,
        image: &ImageReference,
        single_face: bool,
        enhance: bool,
    ) -> Result<DetectionResult, ApiError> {
        let body = DetectRequest {
            single_face,
            face_enhance: u8::from(enhance),
            img: match image {
                ImageReference::Binary(bytes) => Some(to_embedded(bytes)),
                ImageReference::Url(_) => None,
            },
            image_url: image.as_url(),
        };

        let response = self
            .client
            .post(&self.detect_url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let parsed: DetectResponse = Self::parse_response(response).await?;
        let result = DetectionResult::from(parsed);
        tracing::debug!(
            faces = result.face_count,
            has_face = result.has_face(),
            "Face detection finished",
        );
        Ok(result)
    }

    /// Submit an image swap. Returns once the job is accepted.
    pub async fn submit_image_swap(
        &self,
        request: SwapJobRequest,
    ) -> Result<SubmissionAck, ApiError> {
        self.submit("faceswap/highquality/specifyimage", &request)
            .await
    }

    /// Submit a video swap. Returns once the job is accepted.
    pub async fn submit_video_swap(
        &self,
        request: SwapJobRequest,
    ) -> Result<SubmissionAck, ApiError> {
        self.submit("faceswap/highquality/specifyvideo", &request)
            .await
    }

    /// Fetch the remaining account credit.
    pub async fn quota(&self) -> Result<Quota, ApiError> {
        let response = self
            .client
            .get(self.endpoint("faceswap/quota/info"))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let envelope = Self::parse_envelope(response).await?;
        let credit = envelope
            .data
            .as_ref()
            .and_then(|d| d.get("credit"))
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| ApiError::Decode("quota response has no data.credit".into()))?;
        Ok(Quota { credit })
    }

    // ---- private helpers ----

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn submit(&self, path: &str, request: &SwapJobRequest) -> Result<SubmissionAck, ApiError> {
        let payload = SwapPayload::from_request(request);
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let envelope = Self::parse_envelope(response).await?;
        let job_id = envelope.data.as_ref().and_then(|d| {
            d.get("job_id")
                .or_else(|| d.get("_id"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        });

        tracing::info!(
            video = request.is_video(),
            job_id = job_id.as_deref().unwrap_or("-"),
            "Swap job accepted",
        );

        Ok(SubmissionAck {
            job_id,
            message: envelope.msg.unwrap_or_else(|| "OK".into()),
        })
    }

    /// Parse an open-API envelope and reject application-level errors.
    async fn parse_envelope(response: reqwest::Response) -> Result<Envelope, ApiError> {
        let status = response.status().as_u16();
        let envelope: Envelope = Self::parse_response(response).await?;
        match envelope.code {
            Some(code) if code != API_SUCCESS_CODE => Err(ApiError::Service {
                status,
                body: format!(
                    "code {code}: {}",
                    envelope.msg.as_deref().unwrap_or("request rejected")
                ),
            }),
            _ => Ok(envelope),
        }
    }

    /// Map non-2xx statuses onto the error taxonomy.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ApiError::Auth {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(ApiError::Service {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
