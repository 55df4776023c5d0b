#![allow(dead_code)]

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockEncryptMut, KeyIvInit};
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use faceswap_relay::app::{build_app, build_cors_layer};
use faceswap_relay::config::RelayConfig;
use faceswap_relay::crypto::{derive_iv, WebhookCipher};
use faceswap_relay::state::AppState;

pub const CLIENT_ID: &str = "relay-client-id";
pub const CLIENT_SECRET: &str = "0123456789abcdef0123456789abcdef";

pub fn test_config() -> RelayConfig {
    RelayConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        client_id: CLIENT_ID.to_string(),
        client_secret: CLIENT_SECRET.to_string(),
        cors_origins: vec!["*".to_string()],
    }
}

/// Fresh state plus the router built on it, mirroring `main.rs`.
pub fn build_test_app() -> (AppState, Router) {
    let config = test_config();
    let cipher = WebhookCipher::new(&config.client_id, &config.client_secret).unwrap();
    let state = AppState::new(cipher);
    let app = build_app(state.clone(), build_cors_layer(&config).unwrap());
    (state, app)
}

/// Encrypt `plain` the way the face-swap service does.
pub fn encrypt(plain: &str) -> String {
    let ct = cbc::Encryptor::<aes::Aes256>::new_from_slices(
        CLIENT_SECRET.as_bytes(),
        &derive_iv(CLIENT_ID),
    )
    .unwrap()
    .encrypt_padded_vec_mut::<Pkcs7>(plain.as_bytes());
    STANDARD.encode(ct)
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<String>) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.into()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response {
    post_raw(app, uri, body.to_string()).await
}
