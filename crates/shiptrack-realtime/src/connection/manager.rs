//! Connection manager — handles connection lifecycle and inbound routing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shiptrack_core::config::realtime::RealtimeConfig;

use crate::connection::authenticator::ConnectionAuthenticator;
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::room::registry::{user_room, RoomRegistry};

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: Arc<ConnectionPool>,
    rooms: Arc<RoomRegistry>,
    authenticator: ConnectionAuthenticator,
    config: RealtimeConfig,
}

impl ConnectionManager {
    pub fn new(config: RealtimeConfig, authenticator: ConnectionAuthenticator) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            rooms: Arc::new(RoomRegistry::new()),
            authenticator,
            config,
        }
    }

    /// Registers a new authenticated connection.
    ///
    /// Returns the connection handle and a receiver for serialized outbound
    /// messages. If the user is already at the connection limit the oldest
    /// connection is evicted.
    pub fn register(
        &self,
        user_id: Uuid,
        username: String,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, username, tx));

        let existing = self.pool.get_user_connections(&user_id);
        if existing.len() >= self.config.max_connections_per_user {
            warn!(
                %user_id,
                count = existing.len(),
                max = self.config.max_connections_per_user,
                "User at max connections, evicting oldest"
            );
            if let Some(oldest) = existing.first() {
                oldest.mark_dead();
                self.rooms.leave_all(oldest.id);
                self.pool.remove(&oldest.id);
            }
        }

        self.pool.add(handle.clone());

        info!(conn_id = %handle.id, %user_id, "WebSocket connection registered");

        (handle, rx)
    }

    /// Unregisters a connection and cleans up room membership.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            self.rooms.leave_all(*conn_id);
            info!(%conn_id, user_id = %handle.user_id, "WebSocket connection unregistered");
        }
    }

    /// Processes an inbound message from a client.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw_message: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(%conn_id, "Message from unknown connection");
            return;
        };

        handle.touch().await;

        let msg: InboundMessage = match serde_json::from_str(raw_message) {
            Ok(m) => m,
            Err(e) => {
                self.send_error(&handle, "INVALID_MESSAGE", format!("Failed to parse message: {e}"));
                return;
            }
        };

        match msg {
            InboundMessage::Join { token } => self.handle_join(&handle, &token),
            InboundMessage::Pong { .. } => {
                debug!(%conn_id, "Pong received");
            }
        }
    }

    /// Handles a join request, re-verifying the presented credential.
    ///
    /// The credential must resolve to the same user the connection was
    /// authenticated as; anything else is rejected without joining.
    fn handle_join(&self, handle: &ConnectionHandle, token: &str) {
        let claims = match self.authenticator.verify(token) {
            Ok(c) => c,
            Err(e) => {
                warn!(conn_id = %handle.id, error = %e, "Join rejected: invalid credential");
                self.send_error(handle, "UNAUTHORIZED", "Invalid credential".to_string());
                return;
            }
        };

        if claims.user_id() != handle.user_id {
            warn!(conn_id = %handle.id, "Join rejected: credential belongs to another user");
            self.send_error(handle, "FORBIDDEN", "Credential mismatch".to_string());
            return;
        }

        if handle.has_joined() {
            // Client retried the join; re-ack without touching the room.
            debug!(conn_id = %handle.id, "Duplicate join, re-acking");
            self.send_message(
                handle,
                &OutboundMessage::Joined {
                    room: user_room(handle.user_id),
                },
            );
            return;
        }

        let room = user_room(handle.user_id);
        self.rooms.join(room.clone(), handle.id);
        handle.mark_joined();

        self.send_message(handle, &OutboundMessage::Joined { room: room.clone() });
        debug!(conn_id = %handle.id, room, "Connection joined room");
    }

    /// Sends a message to all of a user's joined connections.
    ///
    /// The payload is serialized once; a failed send to one connection does
    /// not affect the others.
    pub fn send_to_user(&self, user_id: &Uuid, message: &OutboundMessage) -> usize {
        let members = self.rooms.members(&user_room(*user_id));
        if members.is_empty() {
            return 0;
        }

        let msg = match serde_json::to_string(message) {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound message");
                return 0;
            }
        };

        let mut sent = 0;
        for conn_id in &members {
            if let Some(handle) = self.pool.get(conn_id) {
                if handle.send(msg.clone()) {
                    sent += 1;
                } else {
                    warn!(%conn_id, "Failed to send to user connection");
                }
            }
        }
        sent
    }

    /// Sends a ping to every live connection.
    pub fn ping_all(&self) {
        let message = OutboundMessage::Ping {
            timestamp: chrono::Utc::now().timestamp(),
        };
        let msg = match serde_json::to_string(&message) {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, "Failed to serialize ping");
                return;
            }
        };

        for conn in self.pool.all_connections() {
            conn.send(msg.clone());
        }
    }

    /// Closes all connections. Used during shutdown.
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            conn.mark_dead();
            self.rooms.leave_all(conn.id);
            self.pool.remove(&conn.id);
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Checks if a user has at least one live connection.
    pub fn is_user_connected(&self, user_id: &Uuid) -> bool {
        !self.pool.get_user_connections(user_id).is_empty()
    }

    fn send_message(&self, handle: &ConnectionHandle, message: &OutboundMessage) {
        match serde_json::to_string(message) {
            Ok(msg) => {
                handle.send(msg);
            }
            Err(e) => error!(error = %e, "Failed to serialize outbound message"),
        }
    }

    fn send_error(&self, handle: &ConnectionHandle, code: &str, message: String) {
        self.send_message(
            handle,
            &OutboundMessage::Error {
                code: code.to_string(),
                message,
            },
        );
    }
}
