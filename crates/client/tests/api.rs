//! Integration tests for [`FaceSwapApi`] against a local stand-in service.
//!
//! Each test starts an axum server on an ephemeral port that mimics the
//! detection, swap and quota endpoints, and records the bodies it
//! receives.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use faceswap_client::api::{ApiError, FaceSwapApi};
use faceswap_core::types::{FaceTarget, ImageReference, ModifyTarget, SwapJobRequest};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Recorder {
    bodies: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn record(&self, headers: &HeaderMap, body: Value) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        self.auth.lock().unwrap().push(auth);
        self.bodies.lock().unwrap().push(body);
    }

    fn last_body(&self) -> Value {
        self.bodies.lock().unwrap().last().cloned().unwrap()
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn api_for(base: &str) -> FaceSwapApi {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    FaceSwapApi::with_client(
        client,
        "secret-token".into(),
        format!("{base}/detect"),
        format!("{base}/api/open/v3/"),
    )
}

fn swap_request(modify: ModifyTarget) -> SwapJobRequest {
    SwapJobRequest {
        source: FaceTarget {
            path: "https://img/source.png".into(),
            opts: "src-landmarks".into(),
        },
        target: FaceTarget {
            path: "https://img/target.png".into(),
            opts: "tgt-landmarks".into(),
        },
        enhance_face: true,
        modify_target: modify,
        callback_address: "https://hook/api/webhook".into(),
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

async fn detect_with_face(
    State(rec): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.record(&headers, body);
    Json(json!({"landmarks_str": "1,2,3", "origin_url": "https://store/uploaded.png"}))
}

#[tokio::test]
async fn detect_by_url_sends_image_url_and_bearer() {
    let rec = Recorder::default();
    let app = Router::new()
        .route("/detect", post(detect_with_face))
        .with_state(rec.clone());
    let base = serve(app).await;

    let result = api_for(&base)
        .detect(&ImageReference::Url("https://img/a.png".into()), true, false)
        .await
        .unwrap();

    assert_eq!(result.landmarks.as_deref(), Some("1,2,3"));
    assert_eq!(result.resolved_location.as_deref(), Some("https://store/uploaded.png"));
    assert_eq!(result.face_count, 1);

    let body = rec.last_body();
    assert_eq!(body["single_face"], true);
    assert_eq!(body["face_enhance"], 0);
    assert_eq!(body["image_url"], "https://img/a.png");
    assert!(body.get("img").is_none());
    assert_eq!(rec.auth.lock().unwrap()[0], "Bearer secret-token");
}

#[tokio::test]
async fn detect_binary_embeds_data_uri() {
    let rec = Recorder::default();
    let app = Router::new()
        .route("/detect", post(detect_with_face))
        .with_state(rec.clone());
    let base = serve(app).await;

    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    api_for(&base)
        .detect(&ImageReference::Binary(png), false, true)
        .await
        .unwrap();

    let body = rec.last_body();
    assert_eq!(body["face_enhance"], 1);
    assert!(body["img"].as_str().unwrap().starts_with("data:image/png;base64,"));
    assert!(body.get("image_url").is_none());
}

#[tokio::test]
async fn detect_without_face_is_not_an_error() {
    let app = Router::new().route(
        "/detect",
        post(|| async { Json(json!({"landmarks_str": null, "origin_url": ""})) }),
    );
    let base = serve(app).await;

    let result = api_for(&base)
        .detect(&ImageReference::Url("https://img/wall.png".into()), true, false)
        .await
        .unwrap();

    assert!(result.landmarks.is_none());
    assert!(result.resolved_location.is_none());
    assert!(!result.has_face());
}

#[tokio::test]
async fn detect_multi_face_array_takes_first_entry() {
    let app = Router::new().route(
        "/detect",
        post(|| async { Json(json!({"landmarks_str": ["face-a", "face-b"]})) }),
    );
    let base = serve(app).await;

    let result = api_for(&base)
        .detect(&ImageReference::Url("https://img/group.png".into()), false, false)
        .await
        .unwrap();

    assert_eq!(result.landmarks.as_deref(), Some("face-a"));
    assert_eq!(result.face_count, 2);
}

#[tokio::test]
async fn detect_empty_array_means_no_face() {
    let app = Router::new().route(
        "/detect",
        post(|| async { Json(json!({"landmarks_str": []})) }),
    );
    let base = serve(app).await;

    let result = api_for(&base)
        .detect(&ImageReference::Url("https://img/none.png".into()), false, false)
        .await
        .unwrap();

    assert!(result.landmarks.is_none());
    assert_eq!(result.face_count, 0);
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let app = Router::new().route(
        "/detect",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid token") }),
    );
    let base = serve(app).await;

    let err = api_for(&base)
        .detect(&ImageReference::Url("https://img/a.png".into()), true, false)
        .await
        .unwrap_err();

    assert_matches!(err, ApiError::Auth { status: 401, ref body } if body == "invalid token");
}

#[tokio::test]
async fn forbidden_maps_to_auth_error() {
    let app = Router::new().route("/detect", post(|| async { StatusCode::FORBIDDEN }));
    let base = serve(app).await;

    let err = api_for(&base)
        .detect(&ImageReference::Url("https://img/a.png".into()), true, false)
        .await
        .unwrap_err();

    assert_matches!(err, ApiError::Auth { status: 403, .. });
}

#[tokio::test]
async fn server_error_maps_to_service_error() {
    let app = Router::new().route(
        "/detect",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let base = serve(app).await;

    let err = api_for(&base)
        .detect(&ImageReference::Url("https://img/a.png".into()), true, false)
        .await
        .unwrap_err();

    assert_matches!(err, ApiError::Service { status: 502, .. });
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let app = Router::new().route("/detect", post(|| async { "not json" }));
    let base = serve(app).await;

    let err = api_for(&base)
        .detect(&ImageReference::Url("https://img/a.png".into()), true, false)
        .await
        .unwrap_err();

    assert_matches!(err, ApiError::Decode(_));
}

#[tokio::test]
async fn unreachable_host_maps_to_network_error() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = api_for(&format!("http://{addr}"))
        .detect(&ImageReference::Url("https://img/a.png".into()), true, false)
        .await
        .unwrap_err();

    assert_matches!(err, ApiError::Network(_));
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

async fn accept_swap(
    State(rec): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.record(&headers, body);
    Json(json!({"code": 1000, "msg": "OK", "data": {"_id": "job-42", "url": ""}}))
}

#[tokio::test]
async fn image_swap_payload_shape() {
    let rec = Recorder::default();
    let app = Router::new()
        .route(
            "/api/open/v3/faceswap/highquality/specifyimage",
            post(accept_swap),
        )
        .with_state(rec.clone());
    let base = serve(app).await;

    let ack = api_for(&base)
        .submit_image_swap(swap_request(ModifyTarget::Image("https://img/target.png".into())))
        .await
        .unwrap();

    assert_eq!(ack.job_id.as_deref(), Some("job-42"));
    assert_eq!(ack.message, "OK");

    let body = rec.last_body();
    assert_eq!(body["sourceImage"][0]["path"], "https://img/source.png");
    assert_eq!(body["sourceImage"][0]["opts"], "src-landmarks");
    assert_eq!(body["targetImage"][0]["opts"], "tgt-landmarks");
    assert_eq!(body["face_enhance"], 1);
    assert_eq!(body["modifyImage"], "https://img/target.png");
    assert!(body.get("modifyVideo").is_none());
    assert_eq!(body["webhookUrl"], "https://hook/api/webhook");
}

#[tokio::test]
async fn video_swap_uses_modify_video() {
    let rec = Recorder::default();
    let app = Router::new()
        .route(
            "/api/open/v3/faceswap/highquality/specifyvideo",
            post(accept_swap),
        )
        .with_state(rec.clone());
    let base = serve(app).await;

    api_for(&base)
        .submit_video_swap(swap_request(ModifyTarget::Video("https://vid/dance.mp4".into())))
        .await
        .unwrap();

    let body = rec.last_body();
    assert_eq!(body["modifyVideo"], "https://vid/dance.mp4");
    assert!(body.get("modifyImage").is_none());
}

#[tokio::test]
async fn application_error_code_is_service_error() {
    let app = Router::new().route(
        "/api/open/v3/faceswap/highquality/specifyimage",
        post(|| async { Json(json!({"code": 1101, "msg": "Insufficient credit"})) }),
    );
    let base = serve(app).await;

    let err = api_for(&base)
        .submit_image_swap(swap_request(ModifyTarget::Image("x".into())))
        .await
        .unwrap_err();

    assert_matches!(err, ApiError::Service { status: 200, ref body } if body.contains("Insufficient credit"));
}

// ---------------------------------------------------------------------------
// Quota
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quota_reads_credit() {
    let app = Router::new().route(
        "/api/open/v3/faceswap/quota/info",
        get(|| async { Json(json!({"code": 1000, "data": {"credit": 12.5}})) }),
    );
    let base = serve(app).await;

    let quota = api_for(&base).quota().await.unwrap();
    assert_eq!(quota.credit, 12.5);
}

#[tokio::test]
async fn quota_without_credit_is_decode_error() {
    let app = Router::new().route(
        "/api/open/v3/faceswap/quota/info",
        get(|| async { Json(json!({"data": {}})) }),
    );
    let base = serve(app).await;

    let err = api_for(&base).quota().await.unwrap_err();
    assert_matches!(err, ApiError::Decode(_));
}
