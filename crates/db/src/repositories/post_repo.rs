//! Repository for the `posts` table.

use chrono::Utc;
use coauthor_core::error::CoreError;
use coauthor_core::permissions::PostAccess;
use coauthor_core::posts::{post_slug, slug_with_suffix, CollabRole, PostType};
use coauthor_core::types::DbId;
use sqlx::PgPool;

use crate::error::{is_unique_violation, RepoError};
use crate::models::post::{CreatePost, Post, PostWithRole};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, slug, post_type, status, owner_id, collab_limit, \
                       published_at, created_at, updated_at";

/// Same columns qualified with the `p` alias for joins.
const P_COLUMNS: &str = "p.id, p.title, p.slug, p.post_type, p.status, p.owner_id, \
                         p.collab_limit, p.published_at, p.created_at, p.updated_at";

/// Slug allocation attempts before giving up with `Conflict`.
const SLUG_ATTEMPTS: u32 = 3;

/// Provides CRUD operations for post metadata.
pub struct PostRepo;

impl PostRepo {
    /// Create a post together with its `OWNER` collaborator row.
    ///
    /// Both rows are written in one transaction. The slug is derived from the
    /// title and the current time; on a slug collision the whole transaction
    /// is retried with a random suffix, and after [`SLUG_ATTEMPTS`] failures
    /// the call returns [`CoreError::Conflict`].
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreatePost,
    ) -> Result<Post, RepoError> {
        let title = input.title.trim();
        let base_slug = post_slug(title, Utc::now().timestamp_millis());
        let mut slug = base_slug.clone();

        for attempt in 1..=SLUG_ATTEMPTS {
            match Self::insert_with_owner(pool, owner_id, title, &slug, input.post_type).await {
                Ok(post) => return Ok(post),
                Err(e) if is_unique_violation(&e, "uq_posts_slug") => {
                    tracing::warn!(slug = %slug, attempt, "Post slug collision, retrying");
                    slug = slug_with_suffix(&base_slug);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CoreError::Conflict(format!("Could not allocate a unique slug for '{title}'")).into())
    }

    async fn insert_with_owner(
        pool: &PgPool,
        owner_id: DbId,
        title: &str,
        slug: &str,
        post_type: PostType,
    ) -> Result<Post, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO posts (title, slug, post_type, owner_id, collab_limit)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let post = sqlx::query_as::<_, Post>(&query)
            .bind(title)
            .bind(slug)
            .bind(post_type.as_str())
            .bind(owner_id)
            .bind(post_type.collab_limit())
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO collaborators (post_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(post.id)
            .bind(owner_id)
            .bind(CollabRole::Owner.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(post)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE slug = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List every post the user holds a collaborator row on, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PostWithRole>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS}, c.role
             FROM posts p
             JOIN collaborators c ON c.post_id = p.id
             WHERE c.user_id = $1
             ORDER BY p.created_at DESC, p.id DESC"
        );
        sqlx::query_as::<_, PostWithRole>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Load the authorization facts for a post: owner plus every
    /// collaborator user id. Returns `None` if the post does not exist.
    pub async fn access(pool: &PgPool, id: DbId) -> Result<Option<PostAccess>, sqlx::Error> {
        let row: Option<(DbId, Vec<DbId>)> = sqlx::query_as(
            "SELECT p.owner_id,
                    COALESCE(array_agg(c.user_id) FILTER (WHERE c.user_id IS NOT NULL), '{}')
             FROM posts p
             LEFT JOIN collaborators c ON c.post_id = p.id
             WHERE p.id = $1
             GROUP BY p.id, p.owner_id",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(owner_id, collaborator_ids)| PostAccess::new(owner_id, collaborator_ids)))
    }

    /// Apply a title change and/or publish in a single statement.
    ///
    /// `None` keeps the current title. Publishing keeps an existing
    /// `published_at`. Returns `None` if the post does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        title: Option<&str>,
        publish: bool,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts
             SET title = COALESCE($2, title),
                 status = CASE WHEN $3 THEN 'PUBLISHED' ELSE status END,
                 published_at = CASE WHEN $3 THEN COALESCE(published_at, NOW())
                                     ELSE published_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(title)
            .bind(publish)
            .fetch_optional(pool)
            .await
    }

    /// Mark a post as published. Already published posts keep their
    /// original `published_at`. Returns `None` if the post does not exist.
    pub async fn publish(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts
             SET status = 'PUBLISHED', published_at = COALESCE(published_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a post. Collaborators and invites cascade; versions are kept
    /// with a `NULL` post reference.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
