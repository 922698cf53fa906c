//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::game::registry::DEFAULT_SESSION;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Target session id; a default session is used when absent
    pub session: Option<String>,
    /// Display name
    pub name: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, query, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, query: WsQuery, state: AppState) {
    let session_id = query.session.unwrap_or_else(|| DEFAULT_SESSION.to_string());
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Outbound channel: the session writes here, the writer task drains
    // to the socket. Session-side sends never block on network I/O.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMsg>();

    let (_session, player_id) = state.registry.connect(&session_id, query.name, tx);
    info!(session_id = %session_id, player_id = %player_id, "New WebSocket connection");

    // Writer task: session messages -> WebSocket
    let writer_player_id = player_id;
    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(player_id = %writer_player_id, error = %e, "Failed to encode message");
                    continue;
                }
            };
            if let Err(e) = ws_sink.send(Message::Text(json)).await {
                debug!(player_id = %writer_player_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    // Reader loop: WebSocket -> session
    let rate_limiter = ConnectionRateLimiter::new();
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(player_id = %player_id, "Rate limited inbound message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(client_msg) => {
                        if let Some(session) = state.registry.get(&session_id) {
                            session.handle_client_message(player_id, client_msg);
                        }
                    }
                    Err(e) => {
                        // Malformed message: discard, keep the connection
                        warn!(player_id = %player_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(player_id = %player_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(player_id = %player_id, "Client initiated close");
                break;
            }
            Err(e) => {
                debug!(player_id = %player_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    state.registry.disconnect(&session_id, player_id);
    writer_handle.abort();

    info!(session_id = %session_id, player_id = %player_id, "WebSocket connection closed");
}
