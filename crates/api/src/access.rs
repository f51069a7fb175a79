//! Loading authorization facts for handlers.

use coauthor_core::error::CoreError;
use coauthor_core::permissions::PostAccess;
use coauthor_core::types::DbId;
use coauthor_db::repositories::PostRepo;
use coauthor_db::DbPool;

use crate::error::AppResult;

/// Load the owner and collaborator set of a post, or 404.
pub async fn post_access(pool: &DbPool, post_id: DbId) -> AppResult<PostAccess> {
    PostRepo::access(pool, post_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Post", post_id).into())
}
