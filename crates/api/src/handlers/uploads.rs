//! Handlers for image uploads.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use coauthor_core::error::CoreError;
use coauthor_core::permissions::require_edit;
use coauthor_core::types::DbId;
use coauthor_db::models::image::CreateImage;
use coauthor_db::repositories::ImageRepo;
use serde::Serialize;

use crate::access::post_access;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for `POST /uploads`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: DbId,
    pub key: String,
    pub url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub bytes: i64,
    pub format: String,
    pub status: String,
}

/// POST /api/v1/uploads
///
/// Multipart fields: `file` (required) and `post_id` (optional). The bytes
/// go to the object store; only the returned reference is recorded.
pub async fn upload_image(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadResponse>>)> {
    let mut data = None;
    let mut post_id: Option<DbId> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                data = Some(bytes);
            }
            Some("post_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                post_id = Some(text.trim().parse().map_err(|_| {
                    CoreError::Validation(format!("Invalid post_id '{}'", text.trim()))
                })?);
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::BadRequest("Missing 'file' field".into()))?;

    if let Some(post_id) = post_id {
        let access = post_access(&state.pool, post_id).await?;
        require_edit(&access, auth.user_id)?;
    }

    let stored = state
        .object_store
        .put(&data)
        .await
        .map_err(CoreError::from)?;

    let image = ImageRepo::create(
        &state.pool,
        &CreateImage {
            post_id,
            uploader_id: auth.user_id,
            storage_key: stored.key,
            url: stored.url,
            width: i32::try_from(stored.width).ok(),
            height: i32::try_from(stored.height).ok(),
            byte_size: stored.bytes as i64,
            format: stored.format.to_string(),
        },
    )
    .await?;

    tracing::info!(
        image_id = image.id,
        uploader_id = auth.user_id,
        ?post_id,
        bytes = image.byte_size,
        "Image uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadResponse {
                id: image.id,
                key: image.storage_key,
                url: image.url,
                width: image.width,
                height: image.height,
                bytes: image.byte_size,
                format: image.format,
                status: image.status,
            },
        }),
    ))
}
