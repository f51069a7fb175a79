use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ai;
use crate::state::AppState;

/// AI routes mounted at `/ai`.
///
/// ```text
/// POST /generate   -> generate
/// GET  /models     -> list_models
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(ai::generate))
        .route("/models", get(ai::list_models))
}
