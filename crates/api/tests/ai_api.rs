//! HTTP-level tests for AI generation, using an in-memory provider.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use coauthor_ai::{Backend, GenerationProvider, Orchestrator, ProviderError};
use common::{body_json, create_post, get_auth, post_json_auth, register};
use serde_json::json;
use sqlx::PgPool;

/// Offers backends `broken` (always fails) and `steady` (echoes), plus a
/// backend that does not support generation.
#[derive(Default)]
struct ScriptedProvider {
    prompts: Mutex<Vec<(String, String)>>,
}

fn backend(name: &str, methods: &[&str]) -> Backend {
    Backend {
        name: name.to_string(),
        display_name: Some(name.to_uppercase()),
        description: None,
        supported_methods: methods.iter().map(|m| m.to_string()).collect(),
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn list_backends(&self) -> Result<Vec<Backend>, ProviderError> {
        Ok(vec![
            backend("embedder", &["embedContent"]),
            backend("broken", &["generateContent"]),
            backend("steady", &["generateContent", "countTokens"]),
        ])
    }

    async fn generate(&self, backend: &str, prompt: &str) -> Result<String, ProviderError> {
        self.prompts
            .lock()
            .unwrap()
            .push((backend.to_string(), prompt.to_string()));
        match backend {
            "broken" => Err(ProviderError::Api {
                status: 429,
                body: "quota exceeded".into(),
            }),
            _ => Ok(format!("Draft from {backend}")),
        }
    }
}

fn scripted_app(pool: PgPool) -> (axum::Router, Arc<ScriptedProvider>) {
    let provider = Arc::new(ScriptedProvider::default());
    let generator = Orchestrator::new(provider.clone(), Duration::from_secs(2));
    let dir = std::env::temp_dir().join(format!("coauthor-test-{}", uuid::Uuid::new_v4()));
    let (app, _) = common::build_test_app_with(pool, generator, dir);
    (app, provider)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn falls_back_to_next_backend(pool: PgPool) {
    let (app, provider) = scripted_app(pool);
    let (token, _) = register(&app, "Alice").await;

    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        &token,
        json!({ "brief": "A post about rust ownership", "tone": "casual" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["backend"], "steady");
    assert_eq!(json["data"]["generated_text"], "Draft from steady");

    let prompts = provider.prompts.lock().unwrap();
    let tried: Vec<&str> = prompts.iter().map(|(b, _)| b.as_str()).collect();
    assert_eq!(tried, ["broken", "steady"]);
    assert!(prompts[0].1.contains("A post about rust ownership"));
    assert!(prompts[0].1.contains("Tone: casual"));
}

/// First backend never answers; the second answers at once.
struct StalledFirstProvider;

#[async_trait]
impl GenerationProvider for StalledFirstProvider {
    async fn list_backends(&self) -> Result<Vec<Backend>, ProviderError> {
        Ok(vec![
            backend("stalled", &["generateContent"]),
            backend("quick", &["generateContent"]),
        ])
    }

    async fn generate(&self, backend: &str, _prompt: &str) -> Result<String, ProviderError> {
        if backend == "stalled" {
            tokio::time::sleep(Duration::from_secs(600)).await;
        }
        Ok(format!("Draft from {backend}"))
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stalled_backend_outlasting_request_timeout_still_falls_back(pool: PgPool) {
    let (token, _) = register(&common::build_test_app(pool.clone()), "Alice").await;

    let dir = std::env::temp_dir().join(format!("coauthor-test-{}", uuid::Uuid::new_v4()));
    let mut config = common::test_config(dir);
    config.request_timeout_secs = 1;
    let generator = Orchestrator::new(Arc::new(StalledFirstProvider), Duration::from_secs(2));
    let (app, _) = common::build_test_app_with_config(pool, generator, config);

    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        &token,
        json!({ "brief": "A post about rust ownership" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["backend"], "quick");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn models_lists_only_generators(pool: PgPool) {
    let (app, _) = scripted_app(pool);
    let (token, _) = register(&app, "Alice").await;

    let response = get_auth(app, "/api/v1/ai/models", &token).await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["configured"], true);
    let names: Vec<&str> = json["data"]["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["broken", "steady"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unconfigured_generation_is_503_not_retryable(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = register(&app, "Alice").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/ai/generate",
        &token,
        json!({ "brief": "A post about rust ownership" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "AI_NOT_CONFIGURED");
    assert_eq!(json["retryable"], false);

    let response = get_auth(app, "/api/v1/ai/models", &token).await;
    assert_eq!(body_json(response).await["data"]["configured"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn brief_is_validated_before_any_attempt(pool: PgPool) {
    let (app, provider) = scripted_app(pool);
    let (token, _) = register(&app, "Alice").await;

    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        &token,
        json!({ "brief": "too short" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(provider.prompts.lock().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn generating_for_a_post_requires_edit_rights(pool: PgPool) {
    let (app, _) = scripted_app(pool);
    let (alice, _) = register(&app, "Alice").await;
    let (bob, _) = register(&app, "Bob Builder").await;
    let post = create_post(&app, &alice, "Launch Notes", "BLOG").await;

    let response = post_json_auth(
        app,
        "/api/v1/ai/generate",
        &bob,
        json!({ "brief": "A post about rust ownership", "post_id": post["id"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
