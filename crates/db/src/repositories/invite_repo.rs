//! Repository for the `invites` table, including atomic redemption.

use chrono::Utc;
use coauthor_core::error::CoreError;
use coauthor_core::invites::{check_redeemable, expires_at, generate_token};
use coauthor_core::posts::CollabRole;
use coauthor_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::invite::{CreateInvite, Invite, InviteDetails, RedeemOutcome};
use crate::repositories::CollaboratorRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, post_id, inviter_id, invitee_email, token, used, used_by, used_at, \
                       expires_at, created_at";

/// Provides invite lifecycle operations.
pub struct InviteRepo;

impl InviteRepo {
    /// Insert a new invite with a fresh token expiring seven days from now.
    ///
    /// Ownership of the post is checked by the caller.
    pub async fn create(
        pool: &PgPool,
        inviter_id: DbId,
        input: &CreateInvite,
    ) -> Result<Invite, sqlx::Error> {
        let query = format!(
            "INSERT INTO invites (post_id, inviter_id, invitee_email, token, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invite>(&query)
            .bind(input.post_id)
            .bind(inviter_id)
            .bind(&input.invitee_email)
            .bind(generate_token())
            .bind(expires_at(Utc::now()))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Invite>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invites WHERE token = $1");
        sqlx::query_as::<_, Invite>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Load an invite with its post and inviter summaries.
    pub async fn find_details(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<InviteDetails>, sqlx::Error> {
        sqlx::query_as::<_, InviteDetails>(
            "SELECT i.token, i.invitee_email, i.used, i.expires_at, i.created_at,
                    p.id AS post_id, p.title AS post_title, p.slug AS post_slug,
                    p.post_type AS post_type,
                    u.id AS inviter_id, u.name AS inviter_name,
                    u.avatar_url AS inviter_avatar_url
             FROM invites i
             JOIN posts p ON p.id = i.post_id
             JOIN users u ON u.id = i.inviter_id
             WHERE i.token = $1",
        )
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    /// List a post's invites, newest first.
    pub async fn list_for_post(pool: &PgPool, post_id: DbId) -> Result<Vec<Invite>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invites WHERE post_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Invite>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    /// Redeem an invite for `actor_id` in a single transaction.
    ///
    /// The invite row is locked with `FOR UPDATE`, so concurrent redemptions
    /// of one token are serialized: the first commits `used = true` and every
    /// later attempt observes it and fails with `AlreadyUsed`. The
    /// collaborator insert and the `used` flag are committed together or not
    /// at all; a full post yields `Conflict` and leaves the invite unused.
    pub async fn redeem(
        pool: &PgPool,
        token: &str,
        actor_id: DbId,
    ) -> Result<RedeemOutcome, RepoError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM invites WHERE token = $1 FOR UPDATE");
        let invite = sqlx::query_as::<_, Invite>(&query)
            .bind(token)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "Invite",
                id: token.to_string(),
            })?;

        check_redeemable(invite.used, invite.expires_at, Utc::now())?;

        let (already_member,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM collaborators WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(invite.post_id)
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await?;

        if !already_member {
            CollaboratorRepo::add_locked(&mut *tx, invite.post_id, actor_id, CollabRole::Editor)
                .await?;
        }

        sqlx::query("UPDATE invites SET used = true, used_by = $2, used_at = NOW() WHERE id = $1")
            .bind(invite.id)
            .bind(actor_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(RedeemOutcome {
            post_id: invite.post_id,
            joined: !already_member,
        })
    }
}
