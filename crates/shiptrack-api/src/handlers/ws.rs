//! WebSocket upgrade handler for the push channel.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: String,
}

/// GET /ws?token={jwt} — WebSocket upgrade.
///
/// The credential is verified before the upgrade; there is no partial-auth
/// state. The client then re-presents the same credential in its join
/// message.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let claims = state.jwt_decoder.decode_access_token(&query.token)?;
    let user_id = claims.user_id();
    let username = claims.username;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, user_id, username, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_socket(state: AppState, user_id: Uuid, username: String, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let manager = state.realtime.manager();
    let (handle, mut outbound_rx) = manager.register(user_id, username);
    let conn_id = handle.id;

    info!(%conn_id, %user_id, "WebSocket connection established");

    // Forward queued outbound messages to the socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                manager.handle_inbound(&conn_id, &text).await;
            }
            Ok(Message::Close(_)) => break,
            // Protocol-level ping/pong is answered by axum itself.
            Ok(_) => {}
            Err(e) => {
                warn!(%conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    manager.unregister(&conn_id);

    info!(%conn_id, %user_id, "WebSocket connection closed");
}
