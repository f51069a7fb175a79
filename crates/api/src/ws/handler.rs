use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use coauthor_core::error::CoreError;
use coauthor_core::realtime::ClientMessage;
use coauthor_core::types::DbId;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Optional query parameters on the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Access token identifying the user behind the connection.
    pub token: Option<String>,
}

/// GET /api/v1/ws
///
/// Upgrade to WebSocket. Anonymous connections are allowed; a `token`
/// query parameter, if present, must be valid.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
) -> AppResult<impl IntoResponse> {
    let user_id = match params.token.as_deref() {
        Some(token) => Some(
            validate_token(token, &state.config.jwt)
                .map_err(|_| {
                    AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
                })?
                .sub,
        ),
        None => None,
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, user_id)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes room join/leave messages on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, user_id: Option<DbId>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, ?user_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone(), user_id).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                handle_client_message(&ws_manager, &conn_id, text.as_str()).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection and abort sender task.
    let removed = ws_manager.remove(&conn_id).await;
    send_task.abort();
    match removed {
        Some(conn) => tracing::info!(
            conn_id = %conn_id,
            user_id = ?conn.user_id,
            rooms = conn.rooms.len(),
            connected_secs = (chrono::Utc::now() - conn.connected_at).num_seconds(),
            "WebSocket disconnected",
        ),
        None => tracing::info!(conn_id = %conn_id, "WebSocket disconnected"),
    }
}

async fn handle_client_message(ws_manager: &WsManager, conn_id: &str, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::JoinPost { post_id }) => {
            if ws_manager.join_post_room(conn_id, post_id).await {
                let members = ws_manager.room_size(post_id).await;
                tracing::debug!(conn_id = %conn_id, post_id, members, "Joined post room");
            }
        }
        Ok(ClientMessage::LeavePost { post_id }) => {
            ws_manager.leave_post_room(conn_id, post_id).await;
            tracing::debug!(conn_id = %conn_id, post_id, "Left post room");
        }
        Err(e) => {
            tracing::debug!(conn_id = %conn_id, error = %e, "Ignoring malformed client message");
        }
    }
}
