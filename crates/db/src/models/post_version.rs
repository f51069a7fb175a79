//! Append-only content snapshots.

use coauthor_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `post_versions` table.
///
/// `post_id` becomes `NULL` if the post is deleted; the snapshot is kept.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostVersion {
    pub id: DbId,
    pub post_id: Option<DbId>,
    pub author_id: Option<DbId>,
    pub snapshot: serde_json::Value,
    pub fingerprint: String,
    pub created_at: Timestamp,
}

/// Version listing entry without the snapshot body.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostVersionSummary {
    pub id: DbId,
    pub post_id: Option<DbId>,
    pub author_id: Option<DbId>,
    pub author_name: Option<String>,
    pub fingerprint: String,
    pub created_at: Timestamp,
}

/// DTO for appending a snapshot.
#[derive(Debug, Clone)]
pub struct CreatePostVersion {
    pub post_id: DbId,
    pub author_id: DbId,
    pub snapshot: serde_json::Value,
}
