//! REST client for a Gemini-style generative language API.
//!
//! Lists models via `GET {base}/models` and generates via
//! `POST {base}/models/{name}:generateContent`, authenticating with the
//! `x-goog-api-key` header.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::provider::{Backend, GenerationProvider};

/// Prefix the API puts in front of model names.
const MODEL_PREFIX: &str = "models/";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for one API endpoint and credential.
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: String,
    display_name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiProvider {
    /// * `base_url` - API root, e.g. `https://generativelanguage.googleapis.com/v1`.
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    // ---- private helpers ----

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn list_backends(&self) -> Result<Vec<Backend>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let list: ModelList = Self::parse_response(response).await?;
        Ok(list.models.into_iter().map(into_backend).collect())
    }

    async fn generate(&self, backend: &str, prompt: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(format!(
                "{}/{MODEL_PREFIX}{backend}:generateContent",
                self.base_url
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: GenerateResponse = Self::parse_response(response).await?;
        first_text(parsed).ok_or(ProviderError::EmptyResponse)
    }
}

fn into_backend(entry: ModelEntry) -> Backend {
    let name = entry
        .name
        .strip_prefix(MODEL_PREFIX)
        .unwrap_or(&entry.name)
        .to_string();
    Backend {
        name,
        display_name: entry.display_name,
        description: entry.description,
        supported_methods: entry.supported_generation_methods,
    }
}

/// Text of the first part of the first candidate, if non-empty.
fn first_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
        .filter(|t| !t.trim().is_empty())
}
