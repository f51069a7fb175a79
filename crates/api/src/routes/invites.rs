use axum::routing::{get, post};
use axum::Router;

use crate::handlers::invites;
use crate::state::AppState;

/// Invite routes mounted at `/invites`.
///
/// ```text
/// POST /                  -> create_invite
/// GET  /{token}           -> inspect_invite (public)
/// POST /accept/{token}    -> accept_invite
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(invites::create_invite))
        .route("/{token}", get(invites::inspect_invite))
        .route("/accept/{token}", post(invites::accept_invite))
}
