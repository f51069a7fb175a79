//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&PgPool` as the first argument. Multi-row invariants (post + owner row,
//! capacity check + insert, invite redemption) run inside one transaction.

pub mod collaborator_repo;
pub mod image_repo;
pub mod invite_repo;
pub mod post_repo;
pub mod post_version_repo;
pub mod user_repo;

pub use collaborator_repo::CollaboratorRepo;
pub use image_repo::ImageRepo;
pub use invite_repo::InviteRepo;
pub use post_repo::PostRepo;
pub use post_version_repo::PostVersionRepo;
pub use user_repo::UserRepo;
