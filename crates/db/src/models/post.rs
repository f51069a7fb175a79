//! Post metadata model and DTOs.
//!
//! There is no content field anywhere in this module: the live body belongs
//! to the content engine, keyed by [`Post::id`].

use coauthor_core::error::CoreError;
use coauthor_core::posts::{PostStatus, PostType};
use coauthor_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `posts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub post_type: String,
    pub status: String,
    pub owner_id: DbId,
    pub collab_limit: i32,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Post {
    pub fn post_type(&self) -> Result<PostType, CoreError> {
        self.post_type.parse()
    }

    pub fn status(&self) -> Result<PostStatus, CoreError> {
        self.status.parse()
    }
}

/// A post as listed for one user, with that user's role on it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostWithRole {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,
    pub role: String,
}

/// DTO for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    pub title: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
}

/// DTO for updating a post's metadata.
///
/// Only `title` and `status` are writable; any other field (notably
/// content) is rejected at deserialization time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub status: Option<PostStatus>,
}
