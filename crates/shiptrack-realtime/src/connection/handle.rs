//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender for pushing serialized messages to the client plus
/// metadata about the connected user. The handle never blocks: sends use
/// `try_send` and a full buffer drops the message for this connection only.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: Uuid,
    /// Username (cached for logging).
    pub username: String,
    /// Sender for serialized outbound messages.
    pub sender: mpsc::Sender<String>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last activity timestamp.
    pub last_activity: tokio::sync::RwLock<DateTime<Utc>>,
    /// Whether the client has completed the join handshake.
    joined: AtomicBool,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    pub fn new(user_id: Uuid, username: String, sender: mpsc::Sender<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            username,
            sender,
            connected_at: now,
            last_activity: tokio::sync::RwLock::new(now),
            joined: AtomicBool::new(false),
            alive: AtomicBool::new(true),
        }
    }

    /// Sends a serialized message to this connection.
    ///
    /// Returns whether the message was queued. A closed receiver marks the
    /// connection dead; a full buffer drops the message.
    pub fn send(&self, msg: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Marks the join handshake as completed.
    pub fn mark_joined(&self) {
        self.joined.store(true, Ordering::SeqCst);
    }

    pub fn has_joined(&self) -> bool {
        self.joined.load(Ordering::SeqCst)
    }

    /// Updates the last activity timestamp.
    pub async fn touch(&self) {
        let mut la = self.last_activity.write().await;
        *la = Utc::now();
    }
}
