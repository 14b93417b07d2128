//! User-visible notifications (toasts) with stable-id deduplication.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::debug;

use shiptrack_entity::Shipment;

/// Visual category of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// A single user-visible notification.
#[derive(Debug, Clone)]
pub struct Toast {
    /// Stable identity. Pushing a toast whose id is already active is a
    /// no-op, which is what makes "exactly one notification" hold under
    /// push/poll races and repeated failures.
    pub id: String,
    pub kind: ToastKind,
    pub message: String,
}

/// Holds active toasts and fans them out to UI subscribers.
#[derive(Debug)]
pub struct ToastCenter {
    active: Mutex<HashMap<String, Toast>>,
    tx: broadcast::Sender<Toast>,
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastCenter {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(64);
        Self {
            active: Mutex::new(HashMap::new()),
            tx,
        }
    }

    /// Shows a toast. Returns false if a toast with the same id is already
    /// active (the duplicate is suppressed).
    pub fn push(&self, toast: Toast) -> bool {
        let mut active = match self.active.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if active.contains_key(&toast.id) {
            debug!(id = %toast.id, "Suppressing duplicate toast");
            return false;
        }
        active.insert(toast.id.clone(), toast.clone());
        let _ = self.tx.send(toast);
        true
    }

    /// Dismisses a toast, allowing the same id to be shown again later.
    pub fn dismiss(&self, id: &str) {
        let mut active = match self.active.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        active.remove(id);
    }

    /// Subscribes to newly shown toasts.
    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.tx.subscribe()
    }

    /// Number of currently active toasts.
    pub fn active_count(&self) -> usize {
        match self.active.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

/// Produces the notifications the update path surfaces, with stable ids.
#[derive(Debug)]
pub struct UserNotifier {
    toasts: ToastCenter,
}

impl Default for UserNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl UserNotifier {
    pub fn new() -> Self {
        Self {
            toasts: ToastCenter::new(),
        }
    }

    /// One notification per distinct status change of a shipment.
    pub fn status_changed(&self, shipment: &Shipment) -> bool {
        self.toasts.push(Toast {
            id: status_toast_id(&shipment.tracking_number, &shipment.status),
            kind: ToastKind::Info,
            message: format!(
                "Shipment {} is now {}",
                shipment.tracking_number, shipment.status
            ),
        })
    }

    /// Clears the active toast for a shipment's previous status. Called
    /// when a new status lands, so a status that recurs after an
    /// intermediate change notifies again; only same-transition duplicates
    /// stay suppressed.
    pub fn status_superseded(&self, tracking_number: &str, previous_status: &str) {
        self.toasts
            .dismiss(&status_toast_id(tracking_number, previous_status));
    }

    /// One notification when a shipment first appears.
    pub fn shipment_added(&self, shipment: &Shipment) -> bool {
        self.toasts.push(Toast {
            id: format!("new:{}", shipment.tracking_number),
            kind: ToastKind::Success,
            message: format!("Now tracking {}", shipment.tracking_number),
        })
    }

    /// One notification when the push channel gives up reconnecting.
    pub fn channel_failed(&self) -> bool {
        self.toasts.push(Toast {
            id: "channel:failed".to_string(),
            kind: ToastKind::Error,
            message: "Live updates unavailable; falling back to periodic refresh".to_string(),
        })
    }

    pub fn toasts(&self) -> &ToastCenter {
        &self.toasts
    }
}

fn status_toast_id(tracking_number: &str, status: &str) -> String {
    format!("status:{}:{}", tracking_number, status.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_id_suppressed() {
        let center = ToastCenter::new();
        let toast = Toast {
            id: "x".to_string(),
            kind: ToastKind::Info,
            message: "hello".to_string(),
        };
        assert!(center.push(toast.clone()));
        assert!(!center.push(toast.clone()));
        assert_eq!(center.active_count(), 1);

        center.dismiss("x");
        assert!(center.push(toast));
    }

    #[test]
    fn test_channel_failure_toast_is_single() {
        let notifier = UserNotifier::new();
        assert!(notifier.channel_failed());
        assert!(!notifier.channel_failed());
        assert_eq!(notifier.toasts().active_count(), 1);
    }
}
