//! Webhook receiving the content engine's document lifecycle hooks.
//!
//! Every request is signed: `X-Content-Signature` carries the hex
//! HMAC-SHA256 of the raw body under `CONTENT_HOOK_SECRET`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coauthor_core::error::CoreError;
use coauthor_core::hashing::verify_hmac_sha256_hex;
use coauthor_core::types::DbId;
use serde::Deserialize;

use crate::auth::jwt::validate_token;
use crate::content;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-content-signature";

/// A lifecycle event from the content engine. `document_name` is the post id.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ContentHookEvent {
    Authenticate {
        document_name: String,
        token: String,
    },
    Load {
        document_name: String,
    },
    Store {
        document_name: String,
        user_id: Option<DbId>,
        document: serde_json::Value,
    },
}

/// POST /api/v1/content/hooks
pub async fn handle_hook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing content hook signature".into()))?;

    if !verify_hmac_sha256_hex(state.config.content_hook_secret.as_bytes(), &body, signature) {
        tracing::warn!("Rejected content hook with bad signature");
        return Err(CoreError::Unauthorized("Invalid content hook signature".into()).into());
    }

    let event: ContentHookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed content hook: {e}")))?;

    let response = match event {
        ContentHookEvent::Authenticate {
            document_name,
            token,
        } => {
            let post_id = parse_document_name(&document_name)?;
            let claims = validate_token(&token, &state.config.jwt)
                .map_err(|_| CoreError::Unauthorized("Invalid or expired token".into()))?;
            let session = content::on_authenticate(&state, post_id, claims.sub).await?;
            Json(DataResponse { data: session }).into_response()
        }
        ContentHookEvent::Load { document_name } => {
            let post_id = parse_document_name(&document_name)?;
            let info = content::on_load_document(&state, post_id).await?;
            Json(DataResponse { data: info }).into_response()
        }
        ContentHookEvent::Store {
            document_name,
            user_id,
            document,
        } => {
            let post_id = parse_document_name(&document_name)?;
            let outcome = content::on_store_document(&state, post_id, user_id, document).await?;
            Json(DataResponse { data: outcome }).into_response()
        }
    };

    Ok(response)
}

fn parse_document_name(name: &str) -> Result<DbId, CoreError> {
    name.parse()
        .map_err(|_| CoreError::Validation(format!("Document name '{name}' is not a post id")))
}
