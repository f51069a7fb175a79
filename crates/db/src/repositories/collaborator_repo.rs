//! Repository for the `collaborators` table.

use coauthor_core::error::CoreError;
use coauthor_core::posts::CollabRole;
use coauthor_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::collaborator::{Collaborator, CollaboratorWithUser};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, post_id, user_id, role, created_at";

/// Provides membership operations for posts.
pub struct CollaboratorRepo;

impl CollaboratorRepo {
    /// List a post's collaborators with public user fields, owner first.
    pub async fn list_for_post(
        pool: &PgPool,
        post_id: DbId,
    ) -> Result<Vec<CollaboratorWithUser>, sqlx::Error> {
        sqlx::query_as::<_, CollaboratorWithUser>(
            "SELECT c.user_id, c.role, u.name, u.email, u.avatar_url, c.created_at AS joined_at
             FROM collaborators c
             JOIN users u ON u.id = c.user_id
             WHERE c.post_id = $1
             ORDER BY (c.role = 'OWNER') DESC, c.created_at, c.id",
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find(
        pool: &PgPool,
        post_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Collaborator>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM collaborators WHERE post_id = $1 AND user_id = $2");
        sqlx::query_as::<_, Collaborator>(&query)
            .bind(post_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &PgPool, post_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM collaborators WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Add a collaborator, enforcing uniqueness and the post's capacity.
    pub async fn add(
        pool: &PgPool,
        post_id: DbId,
        user_id: DbId,
        role: CollabRole,
    ) -> Result<Collaborator, RepoError> {
        let mut tx = pool.begin().await?;
        let collaborator = Self::add_locked(&mut *tx, post_id, user_id, role).await?;
        tx.commit().await?;
        Ok(collaborator)
    }

    /// Capacity check and insert on an open transaction.
    ///
    /// Locks the post row first so concurrent inserts for the same post are
    /// serialized and the count cannot be exceeded.
    pub(crate) async fn add_locked(
        conn: &mut PgConnection,
        post_id: DbId,
        user_id: DbId,
        role: CollabRole,
    ) -> Result<Collaborator, RepoError> {
        let limit: Option<(i32,)> =
            sqlx::query_as("SELECT collab_limit FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *conn)
                .await?;
        let (limit,) = limit.ok_or_else(|| CoreError::not_found("Post", post_id))?;

        let (exists, count): (bool, i64) = sqlx::query_as(
            "SELECT COALESCE(bool_or(user_id = $2), false), COUNT(*)
             FROM collaborators WHERE post_id = $1",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        if exists {
            return Err(
                CoreError::Conflict("User is already a collaborator on this post".into()).into(),
            );
        }
        if count >= i64::from(limit) {
            return Err(CoreError::Conflict(format!(
                "Collaborator limit reached ({limit}) for this post"
            ))
            .into());
        }

        let query = format!(
            "INSERT INTO collaborators (post_id, user_id, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let collaborator = sqlx::query_as::<_, Collaborator>(&query)
            .bind(post_id)
            .bind(user_id)
            .bind(role.as_str())
            .fetch_one(&mut *conn)
            .await?;
        Ok(collaborator)
    }

    /// Remove a non-owner collaborator. Returns `false` if the user had no
    /// row on the post; removing the owner is a validation error.
    pub async fn remove(pool: &PgPool, post_id: DbId, user_id: DbId) -> Result<bool, RepoError> {
        let existing = Self::find(pool, post_id, user_id).await?;
        match existing {
            None => Ok(false),
            Some(c) if c.role == CollabRole::Owner.as_str() => Err(CoreError::Validation(
                "The post owner cannot be removed".into(),
            )
            .into()),
            Some(c) => {
                let result = sqlx::query("DELETE FROM collaborators WHERE id = $1")
                    .bind(c.id)
                    .execute(pool)
                    .await?;
                Ok(result.rows_affected() > 0)
            }
        }
    }
}
