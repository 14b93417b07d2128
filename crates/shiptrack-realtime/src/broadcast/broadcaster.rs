//! Production implementation of the service layer's publisher seam.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use shiptrack_service::{ShipmentEvent, UpdatePublisher};

use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundMessage;

/// Delivers shipment events to the owner's live connections.
///
/// Fire-and-forget: if the user has no joined connections the event is
/// dropped, and a failed send to one connection never affects the others or
/// the emitting operation.
#[derive(Debug, Clone)]
pub struct UpdateBroadcaster {
    manager: Arc<ConnectionManager>,
}

impl UpdateBroadcaster {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl UpdatePublisher for UpdateBroadcaster {
    async fn notify(&self, user_id: Uuid, event: ShipmentEvent) {
        let message = OutboundMessage::from(event);
        let sent = self.manager.send_to_user(&user_id, &message);
        if sent == 0 {
            debug!(%user_id, "No joined connections for user, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiptrack_auth::jwt::{JwtDecoder, JwtEncoder};
    use shiptrack_core::config::auth::AuthConfig;
    use shiptrack_core::config::realtime::RealtimeConfig;
    use shiptrack_entity::Shipment;
    use shiptrack_service::EventKind;

    use crate::connection::authenticator::ConnectionAuthenticator;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "broadcast-test-secret".to_string(),
            jwt_access_ttl_hours: 1,
        }
    }

    fn manager() -> Arc<ConnectionManager> {
        let decoder = Arc::new(JwtDecoder::new(&auth_config()));
        Arc::new(ConnectionManager::new(
            RealtimeConfig::default(),
            ConnectionAuthenticator::new(decoder),
        ))
    }

    fn sample_shipment(user_id: Uuid) -> Shipment {
        let now = chrono::Utc::now();
        Shipment {
            id: Uuid::new_v4(),
            user_id,
            tracking_number: "1Z999AA10123456784".to_string(),
            carrier: Some("ups".to_string()),
            description: None,
            origin: None,
            destination: None,
            status: "In Transit".to_string(),
            estimated_delivery: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn join(manager: &ConnectionManager, user_id: Uuid) -> tokio::sync::mpsc::Receiver<String> {
        let encoder = JwtEncoder::new(&auth_config());
        let (token, _) = encoder
            .generate_access_token(user_id, "alice")
            .expect("encode failed");

        let (handle, mut rx) = manager.register(user_id, "alice".to_string());
        let join_msg = format!(r#"{{"type":"join","token":"{token}"}}"#);
        manager.handle_inbound(&handle.id, &join_msg).await;

        // Drain the join ack.
        let ack = rx.try_recv().expect("expected join ack");
        assert!(ack.contains(r#""type":"joined""#));
        rx
    }

    #[tokio::test]
    async fn test_event_delivered_to_owner_connections() {
        let manager = manager();
        let user_id = Uuid::new_v4();
        let mut rx = join(&manager, user_id).await;

        let broadcaster = UpdateBroadcaster::new(manager.clone());
        broadcaster
            .notify(
                user_id,
                ShipmentEvent::status_change(sample_shipment(user_id)),
            )
            .await;

        let msg = rx.try_recv().expect("expected event");
        assert!(msg.contains(r#""type":"status_change""#));
        assert!(msg.contains("1Z999AA10123456784"));
    }

    #[tokio::test]
    async fn test_event_never_crosses_users() {
        let manager = manager();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut owner_rx = join(&manager, owner).await;
        let mut other_rx = join(&manager, other).await;

        let broadcaster = UpdateBroadcaster::new(manager.clone());
        broadcaster
            .notify(owner, ShipmentEvent::new_shipment(sample_shipment(owner)))
            .await;

        assert!(owner_rx.try_recv().is_ok());
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_event_dropped_when_no_connections() {
        let manager = manager();
        let broadcaster = UpdateBroadcaster::new(manager.clone());

        // Must not panic or error; the event is simply dropped.
        let user_id = Uuid::new_v4();
        broadcaster
            .notify(
                user_id,
                ShipmentEvent {
                    kind: EventKind::StatusChange,
                    shipment: sample_shipment(user_id),
                },
            )
            .await;
    }

    #[tokio::test]
    async fn test_duplicate_join_is_idempotent() {
        let manager = manager();
        let user_id = Uuid::new_v4();

        let encoder = JwtEncoder::new(&auth_config());
        let (token, _) = encoder
            .generate_access_token(user_id, "alice")
            .expect("encode failed");

        let (handle, mut rx) = manager.register(user_id, "alice".to_string());
        let join_msg = format!(r#"{{"type":"join","token":"{token}"}}"#);
        manager.handle_inbound(&handle.id, &join_msg).await;
        manager.handle_inbound(&handle.id, &join_msg).await;

        // Both joins are acked, but delivery stays single.
        assert!(rx.try_recv().expect("first ack").contains(r#""type":"joined""#));
        assert!(rx.try_recv().expect("second ack").contains(r#""type":"joined""#));

        let broadcaster = UpdateBroadcaster::new(manager.clone());
        broadcaster
            .notify(
                user_id,
                ShipmentEvent::status_change(sample_shipment(user_id)),
            )
            .await;

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unjoined_connection_receives_nothing() {
        let manager = manager();
        let user_id = Uuid::new_v4();

        // Registered but never sent a join message.
        let (_handle, mut rx) = manager.register(user_id, "alice".to_string());

        let broadcaster = UpdateBroadcaster::new(manager.clone());
        broadcaster
            .notify(
                user_id,
                ShipmentEvent::status_change(sample_shipment(user_id)),
            )
            .await;

        assert!(rx.try_recv().is_err());
    }
}
