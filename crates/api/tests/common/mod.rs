#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use coauthor_ai::Orchestrator;
use coauthor_core::hashing::hmac_sha256_hex;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use coauthor_api::auth::jwt::JwtConfig;
use coauthor_api::config::{AiConfig, ServerConfig, UploadConfig};
use coauthor_api::router::build_app_router;
use coauthor_api::state::AppState;
use coauthor_api::storage::LocalObjectStore;
use coauthor_api::ws::WsManager;

pub const TEST_HOOK_SECRET: &str = "test-content-hook-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(upload_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-jwt-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 60,
        },
        content_hook_secret: TEST_HOOK_SECRET.to_string(),
        upload: UploadConfig {
            dir: upload_dir.to_string_lossy().into_owned(),
            public_base_url: "/uploads".to_string(),
        },
        ai: AiConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            attempt_timeout_secs: 1,
        },
    }
}

/// Build the full application router, mirroring `main.rs`, with AI
/// generation unconfigured and uploads under a throwaway directory.
pub fn build_test_app(pool: PgPool) -> Router {
    let dir = std::env::temp_dir().join(format!("coauthor-test-{}", uuid::Uuid::new_v4()));
    build_test_app_with(pool, Orchestrator::unconfigured(), dir).0
}

/// Like [`build_test_app`] with an explicit generator and upload directory.
/// Also returns the state so tests can observe the fan-out registry.
pub fn build_test_app_with(
    pool: PgPool,
    generator: Orchestrator,
    upload_dir: PathBuf,
) -> (Router, AppState) {
    build_test_app_with_config(pool, generator, test_config(upload_dir))
}

/// Like [`build_test_app_with`] with a caller-tuned config.
pub fn build_test_app_with_config(
    pool: PgPool,
    generator: Orchestrator,
    config: ServerConfig,
) -> (Router, AppState) {
    let object_store = LocalObjectStore::new(&config.upload.dir, &config.upload.public_base_url);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        generator: Arc::new(generator),
        object_store: Arc::new(object_store),
    };

    (build_app_router(state.clone(), &config), state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, json_request("POST", uri, None, body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response {
    send(app, json_request("POST", uri, Some(token), body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response {
    send(app, json_request("PUT", uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// POST a signed content-engine hook.
pub async fn post_hook(app: Router, body: Value) -> Response {
    let payload = body.to_string();
    let signature = hmac_sha256_hex(TEST_HOOK_SECRET.as_bytes(), payload.as_bytes());
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/content/hooks")
        .header("content-type", "application/json")
        .header("x-content-signature", signature)
        .body(Body::from(payload))
        .expect("request should build");
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Register a user through the API. Returns `(access_token, user_id)`.
pub async fn register(app: &Router, name: &str) -> (String, i64) {
    let email = format!("{}@test.com", name.to_lowercase().replace(' ', "."));
    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({ "name": name, "email": email, "password": "secret123" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let token = json["access_token"].as_str().expect("token").to_string();
    let user_id = json["user"]["id"].as_i64().expect("user id");
    (token, user_id)
}

/// Create a post through the API and return its JSON representation.
pub async fn create_post(app: &Router, token: &str, title: &str, post_type: &str) -> Value {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/posts",
        token,
        json!({ "title": title, "type": post_type }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
