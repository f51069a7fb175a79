//! Wire protocol of the realtime notification channel.
//!
//! Events carry identifiers only; clients re-fetch state over HTTP.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Messages pushed from the server to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Something in the post listing changed; sent to every connection.
    #[serde(rename = "posts:update")]
    PostsChanged,

    /// Content of one post was persisted; sent to that post's room.
    #[serde(rename = "post:content-updated")]
    PostContentChanged { post_id: DbId },
}

/// Messages a client may send over the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join-post")]
    JoinPost { post_id: DbId },

    #[serde(rename = "leave-post")]
    LeavePost { post_id: DbId },
}

impl ServerMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
