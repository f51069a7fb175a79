//! Handlers for the `/ai` resource.

use axum::extract::State;
use axum::Json;
use coauthor_ai::prompt::{build_prompt, validate_brief, validate_hint};
use coauthor_ai::{Backend, Generated};
use coauthor_core::permissions::require_edit;
use coauthor_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::access::post_access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /ai/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub brief: String,
    /// Post the text is meant for; the caller must be able to edit it.
    pub post_id: Option<DbId>,
    pub tone: Option<String>,
    pub length: Option<String>,
}

/// Response body for `GET /ai/models`.
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub configured: bool,
    pub models: Vec<Backend>,
}

/// POST /api/v1/ai/generate
///
/// Try each usable backend in provider order until one succeeds.
pub async fn generate(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<Json<DataResponse<Generated>>> {
    let brief = input.brief.trim();
    validate_brief(brief)?;
    validate_hint("tone", input.tone.as_deref())?;
    validate_hint("length", input.length.as_deref())?;

    if let Some(post_id) = input.post_id {
        let access = post_access(&state.pool, post_id).await?;
        require_edit(&access, auth.user_id)?;
    }

    let prompt = build_prompt(brief, input.tone.as_deref(), input.length.as_deref());
    let generated = state.generator.generate(&prompt).await?;

    tracing::info!(
        user_id = auth.user_id,
        backend = %generated.backend,
        chars = generated.generated_text.len(),
        "AI content generated"
    );

    Ok(Json(DataResponse { data: generated }))
}

/// GET /api/v1/ai/models
///
/// Usable backends. An unconfigured server reports `configured: false`
/// with an empty list instead of failing.
pub async fn list_models(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ModelsResponse>>> {
    if !state.generator.is_configured() {
        return Ok(Json(DataResponse {
            data: ModelsResponse {
                configured: false,
                models: Vec::new(),
            },
        }));
    }

    let models = state.generator.list_usable_backends().await?;
    Ok(Json(DataResponse {
        data: ModelsResponse {
            configured: true,
            models,
        },
    }))
}
