//! Invite model, DTOs and redemption outcome.

use coauthor_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `invites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invite {
    pub id: DbId,
    pub post_id: DbId,
    pub inviter_id: DbId,
    pub invitee_email: Option<String>,
    pub token: String,
    pub used: bool,
    pub used_by: Option<DbId>,
    pub used_at: Option<Timestamp>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

/// An invite joined with summaries of its post and inviter, as shown on
/// the public inspection page.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InviteDetails {
    pub token: String,
    pub invitee_email: Option<String>,
    pub used: bool,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub post_id: DbId,
    pub post_title: String,
    pub post_slug: String,
    pub post_type: String,
    pub inviter_id: DbId,
    pub inviter_name: String,
    pub inviter_avatar_url: Option<String>,
}

/// DTO for creating an invite.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvite {
    pub post_id: DbId,
    pub invitee_email: Option<String>,
}

/// Result of a successful redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RedeemOutcome {
    pub post_id: DbId,
    /// `true` when this redemption added the actor as an editor; `false`
    /// when the actor already had a collaborator row.
    pub joined: bool,
}
