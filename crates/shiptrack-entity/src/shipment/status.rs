//! Shipment status classification.
//!
//! Carriers report status as free text, so the stored value is a string
//! and this enum is a conventional classification over it. Parsing never
//! fails: unrecognized strings classify as [`ShipmentStatus::Other`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conventional shipment status categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Registered but not yet picked up.
    Pending,
    /// Accepted by the carrier, label created.
    Processing,
    /// Handed to the carrier network.
    Shipped,
    /// Moving between facilities.
    InTransit,
    /// On the delivery vehicle.
    OutForDelivery,
    /// Delivered to the recipient.
    Delivered,
    /// Behind schedule.
    Delayed,
    /// Carrier reported a problem.
    Exception,
    /// Cancelled before delivery.
    Cancelled,
    /// Returned to sender.
    Returned,
    /// Anything the conventional set does not cover.
    Other(String),
}

impl ShipmentStatus {
    /// Classify a free-text status string.
    ///
    /// Matching is case-insensitive and treats spaces, hyphens, and
    /// underscores as equivalent ("In Transit" == "in_transit").
    pub fn classify(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "shipped" => Self::Shipped,
            "in_transit" => Self::InTransit,
            "out_for_delivery" => Self::OutForDelivery,
            "delivered" => Self::Delivered,
            "delayed" => Self::Delayed,
            "exception" => Self::Exception,
            "cancelled" | "canceled" => Self::Cancelled,
            "returned" => Self::Returned,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Check whether the status is terminal (no further changes expected).
    ///
    /// Terminal shipments are excluded from polling to bound cost.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Returned)
    }

    /// Check whether a raw status string classifies as terminal.
    pub fn is_terminal_str(raw: &str) -> bool {
        Self::classify(raw).is_terminal()
    }

    /// Return the conventional lowercase form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::InTransit => "in_transit",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Delayed => "delayed",
            Self::Exception => "exception",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Case-insensitive comparison of two raw status strings.
///
/// This is the change-detection predicate: a status transition exists only
/// when the two sides differ under this comparison.
pub fn same_status(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_conventional_forms() {
        assert_eq!(ShipmentStatus::classify("In Transit"), ShipmentStatus::InTransit);
        assert_eq!(ShipmentStatus::classify("in_transit"), ShipmentStatus::InTransit);
        assert_eq!(
            ShipmentStatus::classify("Out-For-Delivery"),
            ShipmentStatus::OutForDelivery
        );
        assert_eq!(ShipmentStatus::classify("DELIVERED"), ShipmentStatus::Delivered);
    }

    #[test]
    fn test_classify_unknown_is_preserved() {
        let status = ShipmentStatus::classify("Held at customs");
        assert_eq!(status, ShipmentStatus::Other("Held at customs".to_string()));
        assert_eq!(status.as_str(), "Held at customs");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ShipmentStatus::is_terminal_str("Delivered"));
        assert!(ShipmentStatus::is_terminal_str("cancelled"));
        assert!(ShipmentStatus::is_terminal_str("Returned"));
        assert!(!ShipmentStatus::is_terminal_str("In Transit"));
        assert!(!ShipmentStatus::is_terminal_str("exception"));
    }

    #[test]
    fn test_same_status_is_case_insensitive() {
        assert!(same_status("In Transit", "in transit"));
        assert!(same_status("Delivered", "DELIVERED"));
        assert!(!same_status("In Transit", "Delivered"));
    }
}
