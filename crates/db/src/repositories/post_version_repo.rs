//! Repository for the append-only `post_versions` table.

use coauthor_core::content::{fingerprint, should_snapshot};
use coauthor_core::error::CoreError;
use coauthor_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::post_version::{CreatePostVersion, PostVersion, PostVersionSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, post_id, author_id, snapshot, fingerprint, created_at";

/// Provides append and read access to content snapshots. There is no
/// update or delete: versions are history.
pub struct PostVersionRepo;

impl PostVersionRepo {
    /// Append a snapshot unless it is identical to the latest one, or empty
    /// while the latest one is too.
    ///
    /// The post row is locked for the duration so two concurrent stores of
    /// the same document cannot both append. Returns `None` when nothing was
    /// written.
    pub async fn append_if_changed(
        pool: &PgPool,
        input: &CreatePostVersion,
    ) -> Result<Option<PostVersion>, RepoError> {
        let mut tx = pool.begin().await?;

        let post: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
                .bind(input.post_id)
                .fetch_optional(&mut *tx)
                .await?;
        if post.is_none() {
            return Err(CoreError::not_found("Post", input.post_id).into());
        }

        let latest: Option<(String, serde_json::Value)> = sqlx::query_as(
            "SELECT fingerprint, snapshot FROM post_versions
             WHERE post_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .bind(input.post_id)
        .fetch_optional(&mut *tx)
        .await?;

        let latest = latest.as_ref().map(|(fp, snapshot)| (fp.as_str(), snapshot));
        if !should_snapshot(latest, &input.snapshot) {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO post_versions (post_id, author_id, snapshot, fingerprint)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let version = sqlx::query_as::<_, PostVersion>(&query)
            .bind(input.post_id)
            .bind(input.author_id)
            .bind(&input.snapshot)
            .bind(fingerprint(&input.snapshot))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(version))
    }

    /// List a post's versions without snapshot bodies, newest first.
    pub async fn list_for_post(
        pool: &PgPool,
        post_id: DbId,
    ) -> Result<Vec<PostVersionSummary>, sqlx::Error> {
        sqlx::query_as::<_, PostVersionSummary>(
            "SELECT v.id, v.post_id, v.author_id, u.name AS author_name,
                    v.fingerprint, v.created_at
             FROM post_versions v
             LEFT JOIN users u ON u.id = v.author_id
             WHERE v.post_id = $1
             ORDER BY v.created_at DESC, v.id DESC",
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
    }

    /// Fetch one version, scoped to its post.
    pub async fn find_for_post(
        pool: &PgPool,
        post_id: DbId,
        id: DbId,
    ) -> Result<Option<PostVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM post_versions WHERE id = $1 AND post_id = $2");
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(id)
            .bind(post_id)
            .fetch_optional(pool)
            .await
    }
}
