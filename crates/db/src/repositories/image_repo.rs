//! Repository for the `images` table.

use coauthor_core::images::ImageStatus;
use sqlx::PgPool;

use crate::models::image::{CreateImage, Image};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, post_id, uploader_id, storage_key, url, status, width, height, \
                       byte_size, format, created_at, updated_at";

/// Provides persistence for uploaded image references.
pub struct ImageRepo;

impl ImageRepo {
    /// Record an upload. New images always start as `PENDING`.
    pub async fn create(pool: &PgPool, input: &CreateImage) -> Result<Image, sqlx::Error> {
        let query = format!(
            "INSERT INTO images
                (post_id, uploader_id, storage_key, url, status, width, height, byte_size, format)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(input.post_id)
            .bind(input.uploader_id)
            .bind(&input.storage_key)
            .bind(&input.url)
            .bind(ImageStatus::Pending.as_str())
            .bind(input.width)
            .bind(input.height)
            .bind(input.byte_size)
            .bind(&input.format)
            .fetch_one(pool)
            .await
    }
}
