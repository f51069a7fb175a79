//! Route definitions for posts and their sub-resources.
//!
//! Slug lookups and id-addressed mutations share the `{post}` segment.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::posts;
use crate::state::AppState;

/// Post routes mounted at `/posts`.
///
/// ```text
/// POST   /                                      -> create_post
/// GET    /                                      -> list_posts
/// GET    /id/{id}                               -> get_post_by_id
/// GET    /{post}                                -> get_post_by_slug
/// PUT    /{post}                                -> update_post
/// DELETE /{post}                                -> delete_post
/// POST   /{post}/publish                        -> publish_post
/// GET    /{post}/collaborators                  -> list_collaborators
/// DELETE /{post}/collaborators/{user_id}        -> remove_collaborator
/// GET    /{post}/versions                       -> list_versions
/// GET    /{post}/versions/{version_id}          -> get_version
/// GET    /{post}/invites                        -> list_post_invites
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(posts::create_post).get(posts::list_posts))
        .route("/id/{id}", get(posts::get_post_by_id))
        .route(
            "/{post}",
            get(posts::get_post_by_slug)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/{post}/publish", post(posts::publish_post))
        .route("/{post}/collaborators", get(posts::list_collaborators))
        .route(
            "/{post}/collaborators/{user_id}",
            delete(posts::remove_collaborator),
        )
        .route("/{post}/versions", get(posts::list_versions))
        .route("/{post}/versions/{version_id}", get(posts::get_version))
        .route("/{post}/invites", get(posts::list_post_invites))
}
