use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use coauthor_core::images::MAX_UPLOAD_BYTES;

use crate::handlers::uploads;
use crate::state::AppState;

/// Room for multipart boundaries and the `post_id` field on top of the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Upload routes mounted at `/uploads`.
///
/// ```text
/// POST /    -> upload_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(uploads::upload_image))
        .layer(DefaultBodyLimit::max(
            MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
        ))
}
