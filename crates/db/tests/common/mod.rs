use coauthor_core::posts::PostType;
use coauthor_db::models::post::{CreatePost, Post};
use coauthor_db::models::user::{CreateUser, User};
use coauthor_db::repositories::{PostRepo, UserRepo};
use sqlx::PgPool;

/// Insert a user with a placeholder hash.
pub async fn create_user(pool: &PgPool, name: &str) -> User {
    let input = CreateUser {
        name: name.to_string(),
        email: format!("{}@test.com", name.to_lowercase().replace(' ', ".")),
        password_hash: "$argon2id$placeholder".to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Create a post owned by `owner`.
pub async fn create_post(pool: &PgPool, owner: &User, title: &str, post_type: PostType) -> Post {
    let input = CreatePost {
        title: title.to_string(),
        post_type,
    };
    PostRepo::create(pool, owner.id, &input)
        .await
        .expect("post creation should succeed")
}
