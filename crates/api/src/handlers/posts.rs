//! Handlers for the `/posts` resource and its sub-resources
//! (collaborators, versions, invites).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use coauthor_core::error::CoreError;
use coauthor_core::permissions::{require_edit, require_owner};
use coauthor_core::posts::{validate_status_transition, validate_title, PostStatus, PostType};
use coauthor_core::types::DbId;
use coauthor_db::models::collaborator::CollaboratorWithUser;
use coauthor_db::models::invite::Invite;
use coauthor_db::models::post::{CreatePost, Post, PostWithRole, UpdatePost};
use coauthor_db::models::post_version::{PostVersion, PostVersionSummary};
use coauthor_db::repositories::{CollaboratorRepo, InviteRepo, PostRepo, PostVersionRepo};
use coauthor_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::access::post_access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /posts`.
///
/// `type` is kept as a string so an unknown value is a validation error
/// rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub post_type: String,
}

/// A post together with its members and version history.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub collaborators: Vec<CollaboratorWithUser>,
    pub versions: Vec<PostVersionSummary>,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// POST /api/v1/posts
///
/// Create a post owned by the caller. The owner collaborator row is
/// written in the same transaction.
pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    let post_type: PostType = input.post_type.parse()?;
    validate_title(&input.title)?;

    let post = PostRepo::create(
        &state.pool,
        auth.user_id,
        &CreatePost {
            title: input.title,
            post_type,
        },
    )
    .await?;

    tracing::info!(
        post_id = post.id,
        slug = %post.slug,
        owner_id = auth.user_id,
        "Post created"
    );
    state.ws_manager.broadcast_posts_changed().await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: post })))
}

/// GET /api/v1/posts
///
/// Posts the caller collaborates on (any role), newest first.
pub async fn list_posts(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PostWithRole>>>> {
    let posts = PostRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: posts }))
}

/// GET /api/v1/posts/id/{id}
pub async fn get_post_by_id(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<PostDetail>>> {
    let post = PostRepo::find_by_id(&state.pool, post_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Post", post_id))?;
    Ok(Json(DataResponse {
        data: load_detail(&state.pool, post).await?,
    }))
}

/// GET /api/v1/posts/{slug}
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<PostDetail>>> {
    let post = PostRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Post",
            id: slug.clone(),
        })?;
    Ok(Json(DataResponse {
        data: load_detail(&state.pool, post).await?,
    }))
}

/// PUT /api/v1/posts/{id}
///
/// Update title and/or status. Any collaborator may retitle; moving to
/// `PUBLISHED` is owner-only and unpublishing is rejected. All checks run
/// before the single write.
pub async fn update_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Json(input): Json<UpdatePost>,
) -> AppResult<Json<DataResponse<Post>>> {
    let access = post_access(&state.pool, post_id).await?;
    require_edit(&access, auth.user_id)?;

    let title = input.title.as_deref().map(str::trim);
    if let Some(title) = title {
        validate_title(title)?;
    }

    let mut publish = false;
    if let Some(requested) = input.status {
        let current = PostRepo::find_by_id(&state.pool, post_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Post", post_id))?
            .status()?;
        validate_status_transition(current, requested)?;
        if requested == PostStatus::Published {
            require_owner(&access, auth.user_id)?;
            publish = current == PostStatus::Draft;
        }
    }

    let post = PostRepo::update(&state.pool, post_id, title, publish)
        .await?
        .ok_or_else(|| CoreError::not_found("Post", post_id))?;

    tracing::info!(post_id, user_id = auth.user_id, publish, "Post updated");
    state.ws_manager.broadcast_posts_changed().await;
    state
        .ws_manager
        .broadcast_post_content_changed(post_id)
        .await;

    Ok(Json(DataResponse { data: post }))
}

/// POST /api/v1/posts/{id}/publish
///
/// Owner-only `DRAFT -> PUBLISHED`. Publishing twice is a no-op.
pub async fn publish_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Post>>> {
    let access = post_access(&state.pool, post_id).await?;
    require_owner(&access, auth.user_id)?;

    let post = PostRepo::publish(&state.pool, post_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Post", post_id))?;

    tracing::info!(post_id, "Post published");
    state.ws_manager.broadcast_posts_changed().await;

    Ok(Json(DataResponse { data: post }))
}

/// DELETE /api/v1/posts/{id}
///
/// Owner-only. Versions are retained without a post reference.
pub async fn delete_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let access = post_access(&state.pool, post_id).await?;
    require_owner(&access, auth.user_id)?;

    if !PostRepo::delete(&state.pool, post_id).await? {
        return Err(CoreError::not_found("Post", post_id).into());
    }

    tracing::info!(post_id, user_id = auth.user_id, "Post deleted");
    state.ws_manager.broadcast_posts_changed().await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// GET /api/v1/posts/{id}/collaborators
pub async fn list_collaborators(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CollaboratorWithUser>>>> {
    post_access(&state.pool, post_id).await?;
    let collaborators = CollaboratorRepo::list_for_post(&state.pool, post_id).await?;
    Ok(Json(DataResponse {
        data: collaborators,
    }))
}

/// DELETE /api/v1/posts/{id}/collaborators/{user_id}
///
/// Owner-only. The owner row itself cannot be removed.
pub async fn remove_collaborator(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((post_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let access = post_access(&state.pool, post_id).await?;
    require_owner(&access, auth.user_id)?;

    if !CollaboratorRepo::remove(&state.pool, post_id, user_id).await? {
        return Err(CoreError::not_found("Collaborator", user_id).into());
    }

    tracing::info!(post_id, removed_user_id = user_id, "Collaborator removed");
    state.ws_manager.broadcast_posts_changed().await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// GET /api/v1/posts/{id}/versions
pub async fn list_versions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PostVersionSummary>>>> {
    let access = post_access(&state.pool, post_id).await?;
    require_edit(&access, auth.user_id)?;

    let versions = PostVersionRepo::list_for_post(&state.pool, post_id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// GET /api/v1/posts/{id}/versions/{version_id}
///
/// Includes the full snapshot.
pub async fn get_version(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((post_id, version_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<PostVersion>>> {
    let access = post_access(&state.pool, post_id).await?;
    require_edit(&access, auth.user_id)?;

    let version = PostVersionRepo::find_for_post(&state.pool, post_id, version_id)
        .await?
        .ok_or_else(|| CoreError::not_found("PostVersion", version_id))?;
    Ok(Json(DataResponse { data: version }))
}

// ---------------------------------------------------------------------------
// Invites
// ---------------------------------------------------------------------------

/// GET /api/v1/posts/{id}/invites
///
/// Owner-only listing of every invite issued for the post.
pub async fn list_post_invites(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Invite>>>> {
    let access = post_access(&state.pool, post_id).await?;
    require_owner(&access, auth.user_id)?;

    let invites = InviteRepo::list_for_post(&state.pool, post_id).await?;
    Ok(Json(DataResponse { data: invites }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_detail(pool: &DbPool, post: Post) -> AppResult<PostDetail> {
    let collaborators = CollaboratorRepo::list_for_post(pool, post.id).await?;
    let versions = PostVersionRepo::list_for_post(pool, post.id).await?;
    Ok(PostDetail {
        post,
        collaborators,
        versions,
    })
}
