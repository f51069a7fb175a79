//! Domain layer for the collaborative post platform.
//!
//! Everything in this crate is pure: no database, network, or filesystem
//! access. The store adapter (`coauthor-db`), the generation orchestrator
//! (`coauthor-ai`) and the HTTP server (`coauthor-api`) all build on the
//! vocabulary, validation rules and decision functions defined here.

pub mod content;
pub mod error;
pub mod hashing;
pub mod images;
pub mod invites;
pub mod permissions;
pub mod posts;
pub mod realtime;
pub mod types;
pub mod users;
