pub mod ai;
pub mod auth;
pub mod content;
pub mod health;
pub mod invites;
pub mod posts;
pub mod uploads;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                              WebSocket
///
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/me                                         current user
///
/// /posts                                           create, list own
/// /posts/id/{id}                                   get by id (public)
/// /posts/{post}                                    get by slug (public), update, delete
/// /posts/{post}/publish                            publish (owner)
/// /posts/{post}/collaborators                      list (public)
/// /posts/{post}/collaborators/{user_id}            remove (owner)
/// /posts/{post}/versions                           list (editors)
/// /posts/{post}/versions/{version_id}              get with snapshot (editors)
/// /posts/{post}/invites                            list (owner)
///
/// /invites                                         create (owner)
/// /invites/{token}                                 inspect (public)
/// /invites/accept/{token}                          redeem
///
/// /content/hooks                                   content engine webhook (signed)
///
/// /uploads                                         image upload (multipart)
/// ```
///
/// `/ai` is mounted separately by the app router, outside the request
/// timeout:
///
/// ```text
/// /ai/generate                                     generate text
/// /ai/models                                       usable backends
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_handler))
        // Identity
        .nest("/auth", auth::router())
        // Posts and their sub-resources
        .nest("/posts", posts::router())
        // Invitations
        .nest("/invites", invites::router())
        // Content engine hooks
        .nest("/content", content::router())
        // Image uploads
        .nest("/uploads", uploads::router())
}
