//! Handlers for the `/invites` resource.
//!
//! Inspection is public so a recipient can see what they were invited to
//! before signing in. Creation is owner-only; acceptance needs any
//! authenticated user.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use coauthor_core::error::CoreError;
use coauthor_core::invites::{check_redeemable, is_well_formed_token, validate_invitee_email};
use coauthor_core::permissions::require_owner;
use coauthor_core::posts::CollabRole;
use coauthor_core::types::{DbId, Timestamp};
use coauthor_core::users::normalize_email;
use coauthor_db::models::invite::{CreateInvite, InviteDetails};
use coauthor_db::repositories::{CollaboratorRepo, InviteRepo};
use serde::Serialize;

use crate::access::post_access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for `POST /invites`. The link is built by the client.
#[derive(Debug, Serialize)]
pub struct CreatedInvite {
    pub token: String,
    pub post_id: DbId,
    pub invitee_email: Option<String>,
    pub expires_at: Timestamp,
}

/// Response body for `POST /invites/accept/{token}`.
#[derive(Debug, Serialize)]
pub struct AcceptedInvite {
    pub post_id: DbId,
    /// Whether this acceptance added the caller as a collaborator.
    pub joined: bool,
    /// The caller's role on the post after acceptance.
    pub role: String,
}

/// POST /api/v1/invites
///
/// Owner-only. Issues a single-use token valid for seven days.
pub async fn create_invite(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateInvite>,
) -> AppResult<impl IntoResponse> {
    let invitee_email = input
        .invitee_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    validate_invitee_email(invitee_email)?;

    let access = post_access(&state.pool, input.post_id).await?;
    require_owner(&access, auth.user_id)?;

    let invite = InviteRepo::create(
        &state.pool,
        auth.user_id,
        &CreateInvite {
            post_id: input.post_id,
            invitee_email: invitee_email.map(normalize_email),
        },
    )
    .await?;

    tracing::info!(
        invite_id = invite.id,
        post_id = invite.post_id,
        inviter_id = auth.user_id,
        "Invite created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedInvite {
                token: invite.token,
                post_id: invite.post_id,
                invitee_email: invite.invitee_email,
                expires_at: invite.expires_at,
            },
        }),
    ))
}

/// GET /api/v1/invites/{token}
///
/// Public. Fails with 404, 409 `INVITE_ALREADY_USED` or 410
/// `INVITE_EXPIRED` as three distinct outcomes.
pub async fn inspect_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<InviteDetails>>> {
    let details = if is_well_formed_token(&token) {
        InviteRepo::find_details(&state.pool, &token).await?
    } else {
        None
    };
    let details = details.ok_or_else(|| invite_not_found(&token))?;

    check_redeemable(details.used, details.expires_at, Utc::now())?;

    Ok(Json(DataResponse { data: details }))
}

/// POST /api/v1/invites/accept/{token}
///
/// Redeem an invite. The collaborator insert and marking the invite used
/// commit atomically; concurrent redemptions of one token have exactly one
/// winner.
pub async fn accept_invite(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<AcceptedInvite>>> {
    if !is_well_formed_token(&token) {
        return Err(invite_not_found(&token).into());
    }

    let outcome = InviteRepo::redeem(&state.pool, &token, auth.user_id).await?;

    let role = match CollaboratorRepo::find(&state.pool, outcome.post_id, auth.user_id).await? {
        Some(collaborator) => collaborator.role,
        None => CollabRole::Editor.as_str().to_string(),
    };

    tracing::info!(
        post_id = outcome.post_id,
        user_id = auth.user_id,
        joined = outcome.joined,
        "Invite redeemed"
    );
    if outcome.joined {
        state.ws_manager.broadcast_posts_changed().await;
    }

    Ok(Json(DataResponse {
        data: AcceptedInvite {
            post_id: outcome.post_id,
            joined: outcome.joined,
            role,
        },
    }))
}

fn invite_not_found(token: &str) -> CoreError {
    CoreError::NotFound {
        entity: "Invite",
        id: token.to_string(),
    }
}
