//! Update channel state machine.
//!
//! One logical push connection per authenticated session. The channel
//! validates the credential shape before touching the network, performs the
//! join handshake, replays the reconnect schedule on failure, and gives up
//! with a single user-visible notification once the retry budget is spent
//! (interval polling takes over from there).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use shiptrack_core::config::client::ClientConfig;
use shiptrack_core::error::AppError;
use shiptrack_core::result::AppResult;
use shiptrack_entity::Shipment;

use crate::backoff::ReconnectBackoff;
use crate::message::{ClientMessage, ServerMessage};
use crate::notify::UserNotifier;
use crate::transport::{ChannelConnection, ChannelTransport};

/// Connectivity state of the channel.
///
/// A failed attempt reports `Disconnected` while the reconnect timer runs,
/// not a transient `Error`: `Error` is terminal, so a watcher seeing it
/// knows the channel will not come back without a fresh `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Not started yet.
    Idle,
    /// A connect or join handshake is in flight.
    Connecting,
    /// Joined and receiving events.
    Connected,
    /// Between reconnect attempts, or cleanly closed.
    Disconnected,
    /// Gave up: bad credential or retry budget spent.
    Error,
}

/// A shipment update delivered over the channel.
#[derive(Debug, Clone)]
pub enum UpdateEvent {
    NewShipment(Shipment),
    StatusChange(Shipment),
}

/// Checks that a bearer credential is shaped like a JWT: three non-empty
/// dot-separated segments. Anything else is rejected before any network
/// traffic happens.
pub fn credential_shape_ok(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3 && segments.iter().all(|s| !s.is_empty())
}

/// Client connection manager for the push channel.
pub struct UpdateChannel<T: ChannelTransport> {
    transport: Arc<T>,
    url: String,
    token: String,
    config: ClientConfig,
    notifier: Arc<UserNotifier>,
    state_tx: watch::Sender<ChannelState>,
    events_tx: broadcast::Sender<UpdateEvent>,
    shutdown_tx: watch::Sender<bool>,
    running: AtomicBool,
}

impl<T: ChannelTransport> UpdateChannel<T> {
    pub fn new(
        transport: T,
        url: impl Into<String>,
        token: impl Into<String>,
        config: ClientConfig,
        notifier: Arc<UserNotifier>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ChannelState::Idle);
        let (events_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            transport: Arc::new(transport),
            url: url.into(),
            token: token.into(),
            config,
            notifier,
            state_tx,
            events_tx,
            shutdown_tx,
            running: AtomicBool::new(false),
        }
    }

    /// Current connectivity state.
    pub fn state(&self) -> ChannelState {
        *self.state_tx.borrow()
    }

    /// Subscribes to state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.state_tx.subscribe()
    }

    /// Subscribes to delivered shipment updates.
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.events_tx.subscribe()
    }

    /// Starts the channel's connect loop.
    ///
    /// A malformed credential fails immediately without a transport call.
    /// Only one loop runs at a time; a second start while one is active is
    /// rejected so two handshakes can never race.
    pub fn start(self: &Arc<Self>) -> AppResult<tokio::task::JoinHandle<()>> {
        if !credential_shape_ok(&self.token) {
            self.set_state(ChannelState::Error);
            return Err(AppError::validation("Credential is not a well-formed token"));
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::conflict("Channel is already running"));
        }

        let channel = self.clone();
        Ok(tokio::spawn(async move {
            channel.run().await;
            channel.running.store(false, Ordering::SeqCst);
        }))
    }

    /// Cleanly closes the channel: the connection is dropped and any pending
    /// reconnect timer is cancelled. No failure notification is raised.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    async fn run(&self) {
        let mut backoff = ReconnectBackoff::from_config(&self.config);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            self.set_state(ChannelState::Connecting);

            match self.connect_once(&mut shutdown_rx, &mut backoff).await {
                SessionEnd::CleanClose => {
                    debug!("Channel closed cleanly");
                    break;
                }
                SessionEnd::CredentialRejected => {
                    warn!("Push channel credential rejected, giving up");
                    self.set_state(ChannelState::Error);
                    self.notifier.channel_failed();
                    return;
                }
                SessionEnd::Dropped => {}
            }

            if *shutdown_rx.borrow() {
                break;
            }

            self.set_state(ChannelState::Disconnected);

            let Some(delay) = backoff.next_delay() else {
                warn!(
                    attempts = backoff.attempts(),
                    "Reconnect budget exhausted, falling back to polling"
                );
                self.set_state(ChannelState::Error);
                self.notifier.channel_failed();
                return;
            };

            debug!(delay_ms = delay.as_millis() as u64, "Waiting before reconnect");

            // The pending timer is cancelled by a clean close.
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown_rx.changed() => break,
            }
        }

        self.set_state(ChannelState::Disconnected);
    }

    /// Runs one connect-join-read session. Returns how it ended.
    async fn connect_once(
        &self,
        shutdown_rx: &mut watch::Receiver<bool>,
        backoff: &mut ReconnectBackoff,
    ) -> SessionEnd {
        let mut conn = match self.transport.connect(&self.url).await {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "Connect attempt failed");
                return SessionEnd::Dropped;
            }
        };

        let join = ClientMessage::Join {
            token: self.token.clone(),
        };
        let join_text = match serde_json::to_string(&join) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "Failed to serialize join message");
                return SessionEnd::Dropped;
            }
        };
        if let Err(e) = conn.send_text(join_text).await {
            debug!(error = %e, "Join send failed");
            return SessionEnd::Dropped;
        }

        loop {
            let incoming = tokio::select! {
                msg = conn.next_text() => msg,
                _ = shutdown_rx.changed() => return SessionEnd::CleanClose,
            };

            let text = match incoming {
                Some(Ok(t)) => t,
                Some(Err(e)) => {
                    debug!(error = %e, "Channel read failed");
                    return SessionEnd::Dropped;
                }
                None => {
                    debug!("Server closed the channel");
                    return SessionEnd::Dropped;
                }
            };

            match serde_json::from_str::<ServerMessage>(&text) {
                Ok(ServerMessage::Joined { room }) => {
                    info!(room, "Push channel established");
                    backoff.reset();
                    self.set_state(ChannelState::Connected);
                }
                Ok(ServerMessage::NewShipment { shipment }) => {
                    let _ = self.events_tx.send(UpdateEvent::NewShipment(shipment));
                }
                Ok(ServerMessage::StatusChange { shipment }) => {
                    let _ = self.events_tx.send(UpdateEvent::StatusChange(shipment));
                }
                Ok(ServerMessage::Ping { timestamp }) => {
                    let pong = ClientMessage::Pong { timestamp };
                    if let Ok(text) = serde_json::to_string(&pong) {
                        if conn.send_text(text).await.is_err() {
                            return SessionEnd::Dropped;
                        }
                    }
                }
                Ok(ServerMessage::Error { code, message }) => {
                    warn!(code, message, "Server reported an error");
                    if code == "UNAUTHORIZED" || code == "FORBIDDEN" {
                        return SessionEnd::CredentialRejected;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "Ignoring unparseable message");
                }
            }
        }
    }

    fn set_state(&self, state: ChannelState) {
        self.state_tx.send_if_modified(|current| {
            if *current != state {
                *current = state;
                true
            } else {
                false
            }
        });
    }
}

/// How a connect-join-read session ended.
enum SessionEnd {
    /// Client-initiated teardown.
    CleanClose,
    /// The server rejected the credential; retrying cannot help.
    CredentialRejected,
    /// The connection failed or dropped; eligible for reconnect.
    Dropped,
}
