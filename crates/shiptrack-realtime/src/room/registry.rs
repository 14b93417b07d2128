//! Room membership registry.
//!
//! Rooms are the delivery scope for shipment events. Every user has exactly
//! one room, `user:<id>`, joined after the handshake; nothing ever
//! subscribes a connection to another user's room.

use std::collections::HashSet;

use dashmap::DashMap;
use uuid::Uuid;

use crate::connection::handle::ConnectionId;

/// Returns the canonical room name for a user.
pub fn user_room(user_id: Uuid) -> String {
    format!("user:{user_id}")
}

/// Tracks which connections have joined which rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → member connection IDs.
    members: DashMap<String, HashSet<ConnectionId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room. Returns false if it was already a member.
    pub fn join(&self, room: String, conn_id: ConnectionId) -> bool {
        self.members.entry(room).or_default().insert(conn_id)
    }

    /// Removes a connection from every room it joined.
    pub fn leave_all(&self, conn_id: ConnectionId) {
        self.members.retain(|_, members| {
            members.remove(&conn_id);
            !members.is_empty()
        });
    }

    /// Returns the member connection IDs of a room.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.members
            .get(room)
            .map(|entry| entry.value().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_leave() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let room = user_room(Uuid::new_v4());

        assert!(registry.join(room.clone(), conn));
        assert!(!registry.join(room.clone(), conn));
        assert_eq!(registry.members(&room), vec![conn]);

        registry.leave_all(conn);
        assert!(registry.members(&room).is_empty());
        assert_eq!(registry.room_count(), 0);
    }
}
