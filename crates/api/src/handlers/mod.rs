pub mod ai;
pub mod auth;
pub mod content;
pub mod invites;
pub mod posts;
pub mod uploads;
