use axum::routing::post;
use axum::Router;

use crate::handlers::content;
use crate::state::AppState;

/// Content engine routes mounted at `/content`.
///
/// ```text
/// POST /hooks    -> handle_hook (HMAC-signed, no user auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/hooks", post(content::handle_hook))
}
