//! Reconciliation layer: exactly-once notifications across push and poll.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use shiptrack_client::channel::UpdateEvent;
use shiptrack_client::notify::UserNotifier;
use shiptrack_client::poller::{ShipmentApi, ShipmentPoller, TrackResult};
use shiptrack_client::reconcile::Reconciler;
use shiptrack_core::config::client::ClientConfig;
use shiptrack_core::error::AppError;
use shiptrack_core::result::AppResult;
use shiptrack_entity::Shipment;

fn shipment(tracking: &str, status: &str) -> Shipment {
    let now = Utc::now();
    Shipment {
        id: uuid::Uuid::new_v4(),
        user_id: uuid::Uuid::new_v4(),
        tracking_number: tracking.to_string(),
        carrier: None,
        description: None,
        origin: None,
        destination: None,
        status: status.to_string(),
        estimated_delivery: None,
        created_at: now,
        updated_at: now,
    }
}

fn setup() -> (Arc<UserNotifier>, Reconciler) {
    let notifier = Arc::new(UserNotifier::new());
    let reconciler = Reconciler::new(notifier.clone());
    (notifier, reconciler)
}

#[test]
fn test_initial_load_raises_no_notifications() {
    let (notifier, reconciler) = setup();
    reconciler.load_initial(vec![
        shipment("A", "In Transit"),
        shipment("B", "Processing"),
    ]);

    assert_eq!(reconciler.snapshot().len(), 2);
    assert_eq!(notifier.toasts().active_count(), 0);
}

#[test]
fn test_push_then_poll_same_change_notifies_once() {
    let (notifier, reconciler) = setup();
    reconciler.load_initial(vec![shipment("A", "In Transit")]);

    let mut delivered = shipment("A", "Delivered");
    delivered.updated_at = Utc::now() + Duration::seconds(1);

    // The same change arrives through both paths.
    reconciler.apply_push(UpdateEvent::StatusChange(delivered.clone()));
    reconciler.apply_poll(TrackResult {
        updated: true,
        shipment: delivered,
    });

    assert_eq!(notifier.toasts().active_count(), 1);
    assert_eq!(reconciler.snapshot()[0].status, "Delivered");
}

#[test]
fn test_poll_without_update_never_notifies() {
    let (notifier, reconciler) = setup();
    reconciler.load_initial(vec![shipment("A", "In Transit")]);

    let mut same = shipment("A", "In Transit");
    same.updated_at = Utc::now() + Duration::seconds(1);
    reconciler.apply_poll(TrackResult {
        updated: false,
        shipment: same,
    });

    assert_eq!(notifier.toasts().active_count(), 0);
}

#[test]
fn test_stale_poll_result_discarded() {
    let (notifier, reconciler) = setup();

    let mut current = shipment("A", "Delivered");
    current.updated_at = Utc::now();
    reconciler.load_initial(vec![current]);

    // A poll issued before the push landed comes back late with old data.
    let mut stale = shipment("A", "In Transit");
    stale.updated_at = Utc::now() - Duration::minutes(10);
    reconciler.apply_poll(TrackResult {
        updated: true,
        shipment: stale,
    });

    assert_eq!(reconciler.snapshot()[0].status, "Delivered");
    assert_eq!(notifier.toasts().active_count(), 0);
}

#[test]
fn test_case_only_difference_is_not_a_change() {
    let (notifier, reconciler) = setup();
    reconciler.load_initial(vec![shipment("A", "in transit")]);

    let mut recased = shipment("A", "In Transit");
    recased.updated_at = Utc::now() + Duration::seconds(1);
    reconciler.apply_push(UpdateEvent::StatusChange(recased));

    assert_eq!(notifier.toasts().active_count(), 0);
}

#[test]
fn test_new_shipment_push_is_idempotent() {
    let (notifier, reconciler) = setup();

    let s = shipment("A", "Processing");
    reconciler.apply_push(UpdateEvent::NewShipment(s.clone()));
    reconciler.apply_push(UpdateEvent::NewShipment(s));

    assert_eq!(reconciler.snapshot().len(), 1);
    assert_eq!(notifier.toasts().active_count(), 1);
}

#[test]
fn test_unrelated_shipments_do_not_interfere() {
    let (notifier, reconciler) = setup();
    reconciler.load_initial(vec![
        shipment("A", "In Transit"),
        shipment("B", "Processing"),
    ]);

    // Updates for A and B arrive out of order relative to each other.
    let mut b_change = shipment("B", "In Transit");
    b_change.updated_at = Utc::now() + Duration::seconds(2);
    let mut a_change = shipment("A", "Delivered");
    a_change.updated_at = Utc::now() + Duration::seconds(1);

    reconciler.apply_push(UpdateEvent::StatusChange(b_change));
    reconciler.apply_push(UpdateEvent::StatusChange(a_change));

    assert_eq!(notifier.toasts().active_count(), 2);
    let statuses: Vec<(String, String)> = reconciler
        .snapshot()
        .into_iter()
        .map(|s| (s.tracking_number, s.status))
        .collect();
    assert!(statuses.contains(&("A".to_string(), "Delivered".to_string())));
    assert!(statuses.contains(&("B".to_string(), "In Transit".to_string())));
}

#[test]
fn test_recurring_status_after_intermediate_change_notifies() {
    let (notifier, reconciler) = setup();
    let mut rx = notifier.toasts().subscribe();
    reconciler.load_initial(vec![shipment("A", "Processing")]);

    let base = Utc::now();
    for (i, status) in ["In Transit", "Exception", "In Transit"].into_iter().enumerate() {
        let mut next = shipment("A", status);
        next.updated_at = base + Duration::seconds(i as i64 + 1);
        reconciler.apply_push(UpdateEvent::StatusChange(next));
    }

    // Three distinct changes, three notifications: the second "In Transit"
    // follows an intermediate change, so it is not a duplicate. Only a
    // repeat of the same transition is suppressed.
    let mut seen = 0;
    while rx.try_recv().is_ok() {
        seen += 1;
    }
    assert_eq!(seen, 3);
    assert_eq!(notifier.toasts().active_count(), 1);
}

#[test]
fn test_refreshing_flags_are_per_shipment() {
    let (_notifier, reconciler) = setup();
    reconciler.load_initial(vec![
        shipment("A", "In Transit"),
        shipment("B", "Processing"),
    ]);

    reconciler.set_refreshing("A", true);
    assert!(reconciler.is_refreshing("A"));
    assert!(!reconciler.is_refreshing("B"));

    reconciler.set_refreshing("A", false);
    assert!(!reconciler.is_refreshing("A"));
}

/// Scripted API for poller tests.
struct FakeApi {
    tracked: Mutex<Vec<String>>,
    responses: Mutex<std::collections::HashMap<String, TrackResult>>,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            tracked: Mutex::new(Vec::new()),
            responses: Mutex::new(std::collections::HashMap::new()),
        }
    }

    fn respond_with(&self, tracking: &str, updated: bool, shipment: Shipment) {
        self.responses.lock().unwrap().insert(
            tracking.to_string(),
            TrackResult { updated, shipment },
        );
    }

    fn tracked(&self) -> Vec<String> {
        self.tracked.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShipmentApi for FakeApi {
    async fn list_shipments(&self) -> AppResult<Vec<Shipment>> {
        Ok(Vec::new())
    }

    async fn track(&self, tracking_number: &str) -> AppResult<TrackResult> {
        self.tracked.lock().unwrap().push(tracking_number.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(tracking_number)
            .cloned()
            .ok_or_else(|| AppError::not_found("Shipment not found"))
    }
}

fn poller_config() -> ClientConfig {
    ClientConfig {
        reconnect_base_delay_ms: 1_000,
        reconnect_max_delay_ms: 30_000,
        max_reconnect_attempts: 5,
        poll_interval_seconds: 120,
    }
}

#[tokio::test]
async fn test_poll_cycle_skips_terminal_shipments() {
    let notifier = Arc::new(UserNotifier::new());
    let reconciler = Arc::new(Reconciler::new(notifier.clone()));
    reconciler.load_initial(vec![
        shipment("ACTIVE", "In Transit"),
        shipment("DONE", "Delivered"),
        shipment("GONE", "Cancelled"),
    ]);

    let api = Arc::new(FakeApi::new());
    let mut refreshed = shipment("ACTIVE", "Out for Delivery");
    refreshed.updated_at = Utc::now() + Duration::seconds(1);
    api.respond_with("ACTIVE", true, refreshed);

    let poller = ShipmentPoller::new(api.clone(), reconciler.clone(), &poller_config());
    poller.run_cycle().await;

    let tracked: HashSet<String> = api.tracked().into_iter().collect();
    assert_eq!(tracked, HashSet::from(["ACTIVE".to_string()]));
    assert_eq!(notifier.toasts().active_count(), 1);

    let statuses: Vec<String> = reconciler.snapshot().into_iter().map(|s| s.status).collect();
    assert!(statuses.contains(&"Out for Delivery".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_poll_cadence_runs_every_interval() {
    let notifier = Arc::new(UserNotifier::new());
    let reconciler = Arc::new(Reconciler::new(notifier));
    reconciler.load_initial(vec![shipment("A", "In Transit")]);

    let api = Arc::new(FakeApi::new());
    let mut same = shipment("A", "In Transit");
    same.updated_at = Utc::now() + Duration::seconds(1);
    api.respond_with("A", false, same);

    let poller = Arc::new(ShipmentPoller::new(
        api.clone(),
        reconciler,
        &poller_config(),
    ));
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let task = tokio::spawn({
        let poller = poller.clone();
        async move { poller.run(shutdown_rx).await }
    });

    // Three intervals elapse. The cadence is unconditional: cycles run
    // whether or not the push channel is healthy, so a pushed event lost
    // in flight is always recovered by the next cycle.
    tokio::time::sleep(std::time::Duration::from_secs(361)).await;

    shutdown_tx.send(true).expect("shutdown send failed");
    task.await.expect("poller task panicked");

    assert!(
        api.tracked().len() >= 3,
        "expected a poll cycle per interval, got {}",
        api.tracked().len()
    );
}

#[tokio::test]
async fn test_poll_cycle_clears_refreshing_flag_on_failure() {
    let notifier = Arc::new(UserNotifier::new());
    let reconciler = Arc::new(Reconciler::new(notifier));
    reconciler.load_initial(vec![shipment("A", "In Transit")]);

    // No scripted response: the track call fails.
    let api = Arc::new(FakeApi::new());
    let poller = ShipmentPoller::new(api, reconciler.clone(), &poller_config());
    poller.run_cycle().await;

    assert!(!reconciler.is_refreshing("A"));
}
