//! Update channel behavior against a scripted transport.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use shiptrack_client::channel::{ChannelState, UpdateChannel, UpdateEvent};
use shiptrack_client::notify::UserNotifier;
use shiptrack_client::transport::{ChannelConnection, ChannelTransport};
use shiptrack_core::config::client::ClientConfig;
use shiptrack_core::result::AppResult;
use shiptrack_entity::Shipment;

const TOKEN: &str = "header.payload.signature";

fn test_config() -> ClientConfig {
    ClientConfig {
        reconnect_base_delay_ms: 1_000,
        reconnect_max_delay_ms: 30_000,
        max_reconnect_attempts: 5,
        poll_interval_seconds: 120,
    }
}

fn sample_shipment() -> Shipment {
    let now = chrono::Utc::now();
    Shipment {
        id: uuid::Uuid::new_v4(),
        user_id: uuid::Uuid::new_v4(),
        tracking_number: "TRACK123".to_string(),
        carrier: None,
        description: None,
        origin: None,
        destination: None,
        status: "In Transit".to_string(),
        estimated_delivery: None,
        created_at: now,
        updated_at: now,
    }
}

/// One scripted connection outcome.
enum Outcome {
    Fail,
    Session(FakeConnection),
}

/// Clones share the script and the call counter, so a test keeps observing
/// the transport after handing a clone to the channel.
#[derive(Clone)]
struct FakeTransport {
    outcomes: Arc<Mutex<VecDeque<Outcome>>>,
    connect_calls: Arc<AtomicU32>,
}

impl FakeTransport {
    fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            connect_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    fn always_failing() -> Self {
        Self::new(Vec::new())
    }

    fn connect_count(&self) -> u32 {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelTransport for FakeTransport {
    type Connection = FakeConnection;

    async fn connect(&self, _url: &str) -> AppResult<Self::Connection> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            Some(Outcome::Session(conn)) => Ok(conn),
            // Default and explicit failures look the same to the channel.
            Some(Outcome::Fail) | None => Err(
                shiptrack_core::error::AppError::service_unavailable("connection refused"),
            ),
        }
    }
}

struct FakeConnection {
    incoming: mpsc::UnboundedReceiver<AppResult<String>>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl FakeConnection {
    /// Returns the connection plus a handle for the "server" side: a sender
    /// to script inbound frames and a log of everything the client sent.
    fn pair() -> (
        Self,
        mpsc::UnboundedSender<AppResult<String>>,
        Arc<Mutex<Vec<String>>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                incoming: rx,
                sent: sent.clone(),
            },
            tx,
            sent,
        )
    }
}

#[async_trait]
impl ChannelConnection for FakeConnection {
    async fn send_text(&mut self, text: String) -> AppResult<()> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn next_text(&mut self) -> Option<AppResult<String>> {
        self.incoming.recv().await
    }
}

#[tokio::test]
async fn test_malformed_credential_rejected_before_network() {
    let transport = FakeTransport::always_failing();
    let notifier = Arc::new(UserNotifier::new());

    for bad in ["", "no-dots", "two.parts", "a..c", "trailing.dot."] {
        let channel = Arc::new(UpdateChannel::new(
            transport.clone(),
            "ws://localhost/ws",
            bad,
            test_config(),
            notifier.clone(),
        ));
        assert!(channel.start().is_err(), "token {bad:?} should be rejected");
        assert_eq!(channel.state(), ChannelState::Error);
    }

    // The transport was never touched.
    assert_eq!(transport.connect_count(), 0);
}

#[tokio::test]
async fn test_second_start_rejected_while_running() {
    let (conn, _server_tx, _sent) = FakeConnection::pair();
    let transport = FakeTransport::new(vec![Outcome::Session(conn)]);
    let notifier = Arc::new(UserNotifier::new());
    let channel = Arc::new(UpdateChannel::new(
        transport.clone(),
        "ws://localhost/ws",
        TOKEN,
        test_config(),
        notifier,
    ));

    let handle = channel.start().expect("first start should succeed");
    assert!(channel.start().is_err(), "second start must be rejected");

    channel.shutdown();
    handle.await.expect("run task panicked");
}

#[tokio::test(start_paused = true)]
async fn test_retry_budget_exhaustion_single_toast() {
    let transport = FakeTransport::always_failing();
    let notifier = Arc::new(UserNotifier::new());
    let channel = Arc::new(UpdateChannel::new(
        transport.clone(),
        "ws://localhost/ws",
        TOKEN,
        test_config(),
        notifier.clone(),
    ));

    let handle = channel.start().expect("start failed");
    handle.await.expect("run task panicked");

    // Initial attempt plus five retries, then it gives up for good.
    assert_eq!(transport.connect_count(), 6);
    assert_eq!(channel.state(), ChannelState::Error);
    assert_eq!(notifier.toasts().active_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_clean_close_cancels_reconnect_without_toast() {
    let transport = FakeTransport::always_failing();
    let notifier = Arc::new(UserNotifier::new());
    let channel = Arc::new(UpdateChannel::new(
        transport.clone(),
        "ws://localhost/ws",
        TOKEN,
        test_config(),
        notifier.clone(),
    ));

    let handle = channel.start().expect("start failed");
    channel.shutdown();
    handle.await.expect("run task panicked");

    // Clean teardown: no failure notification, budget not exhausted.
    assert_eq!(notifier.toasts().active_count(), 0);
    assert_eq!(channel.state(), ChannelState::Disconnected);
    assert!(transport.connect_count() < 6);
}

#[tokio::test]
async fn test_join_handshake_and_event_delivery() {
    let (conn, server_tx, sent) = FakeConnection::pair();
    let transport = FakeTransport::new(vec![Outcome::Session(conn)]);
    let notifier = Arc::new(UserNotifier::new());
    let channel = Arc::new(UpdateChannel::new(
        transport.clone(),
        "ws://localhost/ws",
        TOKEN,
        test_config(),
        notifier,
    ));

    let mut events = channel.subscribe();
    let mut states = channel.watch_state();
    let handle = channel.start().expect("start failed");

    // Ack the join and push a change.
    server_tx
        .send(Ok(r#"{"type":"joined","room":"user:1"}"#.to_string()))
        .expect("send failed");

    // Wait for the Connected transition.
    loop {
        states.changed().await.expect("state channel closed");
        if *states.borrow() == ChannelState::Connected {
            break;
        }
    }

    let shipment = sample_shipment();
    let payload = serde_json::json!({ "type": "status_change", "shipment": shipment });
    server_tx
        .send(Ok(payload.to_string()))
        .expect("send failed");

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed");
    match event {
        UpdateEvent::StatusChange(s) => assert_eq!(s.tracking_number, "TRACK123"),
        other => panic!("unexpected event: {other:?}"),
    }

    // The client sent a join carrying the credential.
    let first_sent = sent.lock().unwrap().first().cloned().expect("nothing sent");
    assert!(first_sent.contains(r#""type":"join""#));
    assert!(first_sent.contains(TOKEN));

    channel.shutdown();
    handle.await.expect("run task panicked");
}

#[tokio::test(start_paused = true)]
async fn test_credential_rejection_stops_retrying() {
    let (conn, server_tx, _sent) = FakeConnection::pair();
    let transport = FakeTransport::new(vec![Outcome::Session(conn)]);
    let notifier = Arc::new(UserNotifier::new());
    let channel = Arc::new(UpdateChannel::new(
        transport.clone(),
        "ws://localhost/ws",
        TOKEN,
        test_config(),
        notifier.clone(),
    ));

    let handle = channel.start().expect("start failed");
    server_tx
        .send(Ok(
            r#"{"type":"error","code":"UNAUTHORIZED","message":"Invalid credential"}"#.to_string(),
        ))
        .expect("send failed");

    handle.await.expect("run task panicked");

    // No reconnect attempts after a definitive rejection.
    assert_eq!(transport.connect_count(), 1);
    assert_eq!(channel.state(), ChannelState::Error);
    assert_eq!(notifier.toasts().active_count(), 1);
}
