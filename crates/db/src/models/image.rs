//! Uploaded image references.

use coauthor_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `images` table. Only the object store's reference and
/// metadata are kept here, never the bytes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Image {
    pub id: DbId,
    pub post_id: Option<DbId>,
    pub uploader_id: DbId,
    pub storage_key: String,
    pub url: String,
    pub status: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub byte_size: i64,
    pub format: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording an upload.
#[derive(Debug, Clone)]
pub struct CreateImage {
    pub post_id: Option<DbId>,
    pub uploader_id: DbId,
    pub storage_key: String,
    pub url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub byte_size: i64,
    pub format: String,
}
