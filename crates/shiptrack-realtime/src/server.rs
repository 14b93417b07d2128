//! Realtime engine — bundles the push components and the keepalive loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use shiptrack_core::config::realtime::RealtimeConfig;

use crate::connection::authenticator::ConnectionAuthenticator;
use crate::connection::manager::ConnectionManager;

/// Owns the connection manager and the keepalive ping task.
#[derive(Debug)]
pub struct RealtimeEngine {
    manager: Arc<ConnectionManager>,
    ping_interval: Duration,
}

impl RealtimeEngine {
    pub fn new(config: RealtimeConfig, authenticator: ConnectionAuthenticator) -> Self {
        let ping_interval = Duration::from_secs(config.ping_interval_seconds);
        Self {
            manager: Arc::new(ConnectionManager::new(config, authenticator)),
            ping_interval,
        }
    }

    /// Returns the connection manager shared with the WebSocket handler.
    pub fn manager(&self) -> Arc<ConnectionManager> {
        self.manager.clone()
    }

    /// Spawns the keepalive loop. It pings all connections on the configured
    /// interval and exits when the shutdown signal fires.
    pub fn spawn_ping_task(&self, mut shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        let manager = self.manager.clone();
        let interval = self.ping_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        manager.ping_all();
                    }
                    result = shutdown.changed() => {
                        if result.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Realtime keepalive loop stopped");
        })
    }

    /// Closes every connection. Called during graceful shutdown.
    pub fn shutdown(&self) {
        self.manager.close_all();
    }
}
