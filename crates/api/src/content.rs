//! Content Store Coordinator.
//!
//! The live document body belongs to the external collaboration engine,
//! addressed by post id. This module reacts to the engine's lifecycle
//! hooks: it authenticates editors, confirms documents exist, and turns
//! store events into append-only [`PostVersion`] snapshots plus a room
//! notification. It never writes content into `posts`.

use coauthor_core::error::CoreError;
use coauthor_core::permissions::{can_edit, PostAccess};
use coauthor_core::types::DbId;
use coauthor_db::models::post::Post;
use coauthor_db::models::post_version::{CreatePostVersion, PostVersion};
use coauthor_db::repositories::{PostRepo, PostVersionRepo};
use serde::Serialize;

use crate::access::post_access;
use crate::error::AppResult;
use crate::state::AppState;

/// Result of an `authenticate` hook.
#[derive(Debug, Serialize)]
pub struct DocumentSession {
    pub user_id: DbId,
    pub can_edit: bool,
    pub read_only: bool,
}

/// Metadata returned for a `load` hook. Never includes content.
#[derive(Debug, Serialize)]
pub struct DocumentInfo {
    pub post_id: DbId,
    pub title: String,
    pub status: String,
}

/// Result of a `store` hook.
#[derive(Debug, Serialize)]
pub struct StoreOutcome {
    /// The snapshot written, or `None` when the document was unchanged or empty.
    pub version_id: Option<DbId>,
}

/// Decide what an already-authenticated user may do with a document.
pub async fn on_authenticate(
    state: &AppState,
    post_id: DbId,
    user_id: DbId,
) -> AppResult<DocumentSession> {
    let access = post_access(&state.pool, post_id).await?;
    let editable = can_edit(&access, user_id);
    Ok(DocumentSession {
        user_id,
        can_edit: editable,
        read_only: !editable,
    })
}

/// Confirm a document id maps to a post.
pub async fn on_load_document(state: &AppState, post_id: DbId) -> AppResult<DocumentInfo> {
    let post: Post = PostRepo::find_by_id(&state.pool, post_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Post", post_id))?;

    tracing::debug!(post_id, "Content engine loading document");

    Ok(DocumentInfo {
        post_id: post.id,
        title: post.title,
        status: post.status,
    })
}

/// Snapshot a persisted document if it changed, then notify the post room.
pub async fn on_store_document(
    state: &AppState,
    post_id: DbId,
    user_id: Option<DbId>,
    document: serde_json::Value,
) -> AppResult<StoreOutcome> {
    let access = post_access(&state.pool, post_id).await?;
    let author_id = attribute_author(&access, user_id);

    let version: Option<PostVersion> = PostVersionRepo::append_if_changed(
        &state.pool,
        &CreatePostVersion {
            post_id,
            author_id,
            snapshot: document,
        },
    )
    .await?;

    match &version {
        Some(v) => {
            tracing::info!(post_id, version_id = v.id, author_id, "Post version recorded");
            state.ws_manager.broadcast_post_content_changed(post_id).await;
        }
        None => {
            tracing::debug!(post_id, "Document unchanged, no version written");
        }
    }

    Ok(StoreOutcome {
        version_id: version.map(|v| v.id),
    })
}

/// The editing user if they are a member, otherwise the post owner.
fn attribute_author(access: &PostAccess, user_id: Option<DbId>) -> DbId {
    user_id
        .filter(|id| can_edit(access, *id))
        .unwrap_or(access.owner_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_are_credited_and_strangers_fall_back_to_owner() {
        let access = PostAccess::new(1, vec![1, 2]);
        assert_eq!(attribute_author(&access, Some(2)), 2);
        assert_eq!(attribute_author(&access, Some(9)), 1);
        assert_eq!(attribute_author(&access, None), 1);
    }
}
