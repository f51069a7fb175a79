//! HTTP-level tests for the invitation lifecycle.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, create_post, get, get_auth, post_json_auth, register};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_invite(app: &Router, token: &str, post_id: &Value) -> String {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/invites",
        token,
        json!({ "post_id": post_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invite_inspect_redeem_then_already_used(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (alice, _) = register(&app, "Alice").await;
    let (bob, bob_id) = register(&app, "Bob Builder").await;
    let (carol, _) = register(&app, "Carol").await;
    let post = create_post(&app, &alice, "Launch Notes", "BLOG").await;

    let invite = create_invite(&app, &alice, &post["id"]).await;
    assert_eq!(invite.len(), 48);

    let response = get(app.clone(), &format!("/api/v1/invites/{invite}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let details = body_json(response).await["data"].clone();
    assert_eq!(details["post_title"], "Launch Notes");
    assert_eq!(details["inviter_name"], "Alice");
    assert_eq!(details["used"], false);

    let accept = format!("/api/v1/invites/accept/{invite}");
    let response = post_json_auth(app.clone(), &accept, &bob, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await["data"].clone();
    assert_eq!(outcome["post_id"], post["id"]);
    assert_eq!(outcome["joined"], true);
    assert_eq!(outcome["role"], "EDITOR");

    let response = get_auth(app.clone(), "/api/v1/posts", &bob).await;
    let posts = body_json(response).await["data"].clone();
    assert_eq!(posts[0]["role"], "EDITOR");

    let response = post_json_auth(app.clone(), &accept, &carol, json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVITE_ALREADY_USED");

    let response = get(app.clone(), &format!("/api/v1/invites/{invite}")).await;
    assert_eq!(body_json(response).await["code"], "INVITE_ALREADY_USED");

    let response = get(app, &format!("/api/v1/posts/{}/collaborators", post["id"])).await;
    let members = body_json(response).await["data"].clone();
    let ids: Vec<i64> = members
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["user_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&bob_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_owner_creates_invites(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (alice, _) = register(&app, "Alice").await;
    let (bob, _) = register(&app, "Bob Builder").await;
    let post = create_post(&app, &alice, "Launch Notes", "BLOG").await;

    let response = post_json_auth(
        app,
        "/api/v1/invites",
        &bob,
        json!({ "post_id": post["id"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_token_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (bob, _) = register(&app, "Bob Builder").await;
    let token = "ab".repeat(24);

    let response = get(app.clone(), &format!("/api/v1/invites/{token}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app.clone(), "/api/v1/invites/short").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response =
        post_json_auth(app, &format!("/api/v1/invites/accept/{token}"), &bob, json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_invite_is_gone(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (alice, _) = register(&app, "Alice").await;
    let (bob, _) = register(&app, "Bob Builder").await;
    let post = create_post(&app, &alice, "Launch Notes", "BLOG").await;
    let invite = create_invite(&app, &alice, &post["id"]).await;

    sqlx::query("UPDATE invites SET expires_at = NOW() - INTERVAL '1 minute' WHERE token = $1")
        .bind(&invite)
        .execute(&pool)
        .await
        .unwrap();

    let response = get(app.clone(), &format!("/api/v1/invites/{invite}")).await;
    assert_eq!(response.status(), StatusCode::GONE);
    assert_eq!(body_json(response).await["code"], "INVITE_EXPIRED");

    let response =
        post_json_auth(app, &format!("/api/v1/invites/accept/{invite}"), &bob, json!({})).await;
    assert_eq!(response.status(), StatusCode::GONE);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_accepts_have_one_winner(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (alice, _) = register(&app, "Alice").await;
    let (bob, _) = register(&app, "Bob Builder").await;
    let (carol, _) = register(&app, "Carol").await;
    let post = create_post(&app, &alice, "Launch Notes", "BLOG").await;
    let invite = create_invite(&app, &alice, &post["id"]).await;
    let accept = format!("/api/v1/invites/accept/{invite}");

    let (first, second) = tokio::join!(
        post_json_auth(app.clone(), &accept, &bob, json!({})),
        post_json_auth(app.clone(), &accept, &carol, json!({})),
    );

    let mut statuses = [first.status().as_u16(), second.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 409]);

    let response = get(app, &format!("/api/v1/posts/{}/collaborators", post["id"])).await;
    let members = body_json(response).await["data"].clone();
    assert_eq!(members.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn owner_lists_post_invites(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (alice, _) = register(&app, "Alice").await;
    let (bob, _) = register(&app, "Bob Builder").await;
    let post = create_post(&app, &alice, "Launch Notes", "BLOG").await;
    create_invite(&app, &alice, &post["id"]).await;
    create_invite(&app, &alice, &post["id"]).await;
    let uri = format!("/api/v1/posts/{}/invites", post["id"]);

    let response = get_auth(app.clone(), &uri, &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let response = get_auth(app, &uri, &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
