//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the table, plus the create / update DTOs the repositories accept.

pub mod collaborator;
pub mod image;
pub mod invite;
pub mod post;
pub mod post_version;
pub mod user;
