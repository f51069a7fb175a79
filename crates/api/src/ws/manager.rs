use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use coauthor_core::realtime::ServerMessage;
use coauthor_core::types::{DbId, Timestamp};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Outbound messages buffered per connection before new ones are dropped.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::Sender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user ID, if the client presented a token.
    pub user_id: Option<DbId>,
    /// Bounded channel for outbound messages to this connection.
    pub sender: WsSender,
    pub connected_at: Timestamp,
    /// Posts whose room this connection has joined.
    pub rooms: HashSet<DbId>,
}

/// Registry of live connections and their post-room interest sets.
///
/// Thread-safe via interior `RwLock`; constructed once at startup, wrapped
/// in `Arc` and handed to every handler through `AppState`.
///
/// Delivery is best-effort and at-most-once: each send is a non-blocking
/// `try_send`, so a slow or dead connection loses the event while every
/// other connection still receives it. Nothing is replayed on reconnect.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String, user_id: Option<DbId>) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let conn = WsConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
            rooms: HashSet::new(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID, dropping all its room memberships.
    ///
    /// Returns the removed connection, or `None` if it was unknown.
    pub async fn remove(&self, conn_id: &str) -> Option<WsConnection> {
        self.connections.write().await.remove(conn_id)
    }

    /// Subscribe a connection to a post's room.
    ///
    /// Returns `false` if the connection is unknown.
    pub async fn join_post_room(&self, conn_id: &str, post_id: DbId) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.rooms.insert(post_id);
                true
            }
            None => false,
        }
    }

    /// Unsubscribe a connection from a post's room.
    ///
    /// Returns `false` if the connection is unknown or was not in the room.
    pub async fn leave_post_room(&self, conn_id: &str, post_id: DbId) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => conn.rooms.remove(&post_id),
            None => false,
        }
    }

    /// Number of connections currently in a post's room.
    pub async fn room_size(&self, post_id: DbId) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|c| c.rooms.contains(&post_id))
            .count()
    }

    /// Tell every connection that the post listing changed.
    pub async fn broadcast_posts_changed(&self) -> usize {
        self.broadcast(Message::Text(ServerMessage::PostsChanged.to_json().into()))
            .await
    }

    /// Tell the connections in a post's room that its content changed.
    pub async fn broadcast_post_content_changed(&self, post_id: DbId) -> usize {
        let message = Message::Text(ServerMessage::PostContentChanged { post_id }.to_json().into());
        let conns = self.connections.read().await;
        let mut delivered = 0;
        for (conn_id, conn) in conns.iter().filter(|(_, c)| c.rooms.contains(&post_id)) {
            if deliver(conn_id, conn, message.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Broadcast a message to all connected clients.
    ///
    /// Returns the number of connections the message was queued for.
    pub async fn broadcast(&self, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut delivered = 0;
        for (conn_id, conn) in conns.iter() {
            if deliver(conn_id, conn, message.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.try_send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Queue a Ping frame for every connection; returns how many accepted it.
    pub async fn ping_all(&self) -> usize {
        let conns = self.connections.read().await;
        conns
            .values()
            .filter(|c| c.sender.try_send(Message::Ping(Bytes::new())).is_ok())
            .count()
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue a message without waiting. A full or closed queue drops it.
fn deliver(conn_id: &str, conn: &WsConnection, message: Message) -> bool {
    match conn.sender.try_send(message) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::warn!(conn_id = %conn_id, "WebSocket queue full, dropping event");
            false
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!(conn_id = %conn_id, "WebSocket queue closed, dropping event");
            false
        }
    }
}
