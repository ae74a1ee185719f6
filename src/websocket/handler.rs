use std::sync::Arc;
use axum::{
    extract::{Query, State, ws::{Message, WebSocket, WebSocketUpgrade}},
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::auth::Role;
use crate::hub::{BroadcastHub, Connection, ConnectionGuard};
use crate::models::ClientMessage;
use crate::services::auth_service::get_auth_token;
use crate::state::AppState;
use crate::websocket::msg_cursor_handler::handle_cursor_message;
use crate::websocket::msg_update_handler::handle_update_message;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    let token = get_auth_token(params.token.as_deref(), &headers, &state.config.session_cookie);
    let role = state.tokens.role_for(token.as_deref());
    debug!("WebSocket upgrade requested as {:?}", role);
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, role, hub))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, role: Role, hub: Arc<BroadcastHub>) {
    let (conn, mut outbound) = Connection::open(role);

    // Deregistration and the final viewer count run whenever this scope is left
    let _guard = ConnectionGuard::new(hub.clone(), conn.id, role);

    // Register, which also queues the snapshot ahead of anything else
    match role {
        Role::Admin => hub.connect_admin(conn.clone()),
        Role::Viewer => hub.connect_viewer(conn.clone()),
    }
    info!("WebSocket connection {} established as {:?}", conn.id, role);

    let (mut sender, mut receiver) = socket.split();

    // Drain the hub's queue for this connection onto the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Read client frames until close or transport error
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => dispatch_message(&text, &conn, &hub),
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    debug!("WebSocket error on connection {}: {}", conn.id, e);
                    break;
                }
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };
}

/// Parse one text frame and act on it. Anything unexpected is ignored.
pub fn dispatch_message(text: &str, conn: &Connection, hub: &BroadcastHub) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Update { content }) => handle_update_message(content, conn, hub),
        Ok(ClientMessage::Cursor { position }) => handle_cursor_message(position, conn, hub),
        Ok(ClientMessage::Unknown) => debug!("Ignoring unknown message type from {}", conn.id),
        Err(e) => debug!("Ignoring unparseable message from {}: {}", conn.id, e),
    }
}
