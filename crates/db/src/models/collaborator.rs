//! Collaborator membership model.

use coauthor_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `collaborators` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Collaborator {
    pub id: DbId,
    pub post_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
}

/// A collaborator joined with the public fields of its user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CollaboratorWithUser {
    pub user_id: DbId,
    pub role: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub joined_at: Timestamp,
}
