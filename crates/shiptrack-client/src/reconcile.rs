//! Reconciliation layer.
//!
//! Merges push-delivered and poll-derived updates into one displayed list.
//! The displayed record is the source of truth for change detection, so a
//! change learned through both paths notifies once, and a result that is
//! older (by store timestamp) than what is displayed is discarded.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use shiptrack_entity::shipment::status::same_status;
use shiptrack_entity::Shipment;

use crate::channel::UpdateEvent;
use crate::notify::UserNotifier;
use crate::poller::TrackResult;

#[derive(Debug, Clone)]
struct Displayed {
    shipment: Shipment,
    refreshing: bool,
}

/// Client-side shipment list with exactly-once change notifications.
#[derive(Debug)]
pub struct Reconciler {
    displayed: DashMap<String, Displayed>,
    notifier: Arc<UserNotifier>,
}

impl Reconciler {
    pub fn new(notifier: Arc<UserNotifier>) -> Self {
        Self {
            displayed: DashMap::new(),
            notifier,
        }
    }

    /// Replaces the displayed list with a freshly fetched one. Raises no
    /// notifications; this is the initial page load.
    pub fn load_initial(&self, shipments: Vec<Shipment>) {
        self.displayed.clear();
        for shipment in shipments {
            self.displayed.insert(
                shipment.tracking_number.clone(),
                Displayed {
                    shipment,
                    refreshing: false,
                },
            );
        }
    }

    /// Applies a push-delivered update.
    pub fn apply_push(&self, event: UpdateEvent) {
        match event {
            UpdateEvent::NewShipment(shipment) => self.merge(shipment, true, true),
            UpdateEvent::StatusChange(shipment) => self.merge(shipment, false, true),
        }
    }

    /// Applies a poll result. `updated=false` means the server detected no
    /// change, so no notification may be raised even if the record differs
    /// cosmetically.
    pub fn apply_poll(&self, result: TrackResult) {
        self.merge(result.shipment, false, result.updated);
    }

    /// Current displayed shipments, newest first.
    pub fn snapshot(&self) -> Vec<Shipment> {
        let mut shipments: Vec<Shipment> = self
            .displayed
            .iter()
            .map(|entry| entry.value().shipment.clone())
            .collect();
        shipments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        shipments
    }

    /// Tracking numbers eligible for the interval fallback poll; terminal
    /// shipments are skipped.
    pub fn pollable_tracking_numbers(&self) -> Vec<String> {
        self.displayed
            .iter()
            .filter(|entry| !entry.value().shipment.is_terminal())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Marks a shipment as mid-refresh. Flags are per shipment; concurrent
    /// refreshes of other shipments are unaffected.
    pub fn set_refreshing(&self, tracking_number: &str, refreshing: bool) {
        if let Some(mut entry) = self.displayed.get_mut(tracking_number) {
            entry.refreshing = refreshing;
        }
    }

    pub fn is_refreshing(&self, tracking_number: &str) -> bool {
        self.displayed
            .get(tracking_number)
            .map(|entry| entry.refreshing)
            .unwrap_or(false)
    }

    /// Removes a shipment from the displayed list.
    pub fn remove(&self, tracking_number: &str) {
        self.displayed.remove(tracking_number);
    }

    fn merge(&self, incoming: Shipment, announce_new: bool, allow_notify: bool) {
        let key = incoming.tracking_number.clone();

        let Some(mut entry) = self.displayed.get_mut(&key) else {
            if announce_new {
                self.notifier.shipment_added(&incoming);
            } else if allow_notify {
                self.notifier.status_changed(&incoming);
            }
            drop(self.displayed.insert(
                key,
                Displayed {
                    shipment: incoming,
                    refreshing: false,
                },
            ));
            return;
        };

        // Stale result: older than what is already displayed.
        if incoming.updated_at < entry.shipment.updated_at {
            debug!(
                tracking_number = %key,
                "Discarding stale update (older than displayed value)"
            );
            return;
        }

        let changed = !same_status(&entry.shipment.status, &incoming.status);
        let previous_status = entry.shipment.status.clone();
        entry.shipment = incoming;

        if changed {
            // Retire the old status toast so a later return to that status
            // counts as a new change, not a duplicate.
            self.notifier.status_superseded(&key, &previous_status);
            if allow_notify {
                self.notifier.status_changed(&entry.shipment);
            }
        }
    }
}
