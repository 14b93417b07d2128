//! Milestone normalization.
//!
//! Ship24 reports shipment progress as a milestone code. The rest of the
//! system (and the UI) works with conventional status strings, so every
//! lookup result passes through [`status_from_milestone`] before it is
//! compared against stored values.

/// Maps a carrier milestone code to the conventional status string.
///
/// Unknown milestones pass through unchanged so a new carrier state is
/// still visible to the user rather than silently swallowed.
pub fn status_from_milestone(milestone: &str) -> String {
    match milestone.to_ascii_lowercase().as_str() {
        "pending" | "info_received" => "Processing".to_string(),
        "in_transit" => "In Transit".to_string(),
        "out_for_delivery" => "Out for Delivery".to_string(),
        "delivered" => "Delivered".to_string(),
        "available_for_pickup" => "Available for Pickup".to_string(),
        "failed_attempt" => "Failed Attempt".to_string(),
        "exception" => "Exception".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_milestones() {
        assert_eq!(status_from_milestone("pending"), "Processing");
        assert_eq!(status_from_milestone("info_received"), "Processing");
        assert_eq!(status_from_milestone("in_transit"), "In Transit");
        assert_eq!(status_from_milestone("out_for_delivery"), "Out for Delivery");
        assert_eq!(status_from_milestone("delivered"), "Delivered");
        assert_eq!(status_from_milestone("exception"), "Exception");
    }

    #[test]
    fn test_milestone_case_insensitive() {
        assert_eq!(status_from_milestone("IN_TRANSIT"), "In Transit");
        assert_eq!(status_from_milestone("Delivered"), "Delivered");
    }

    #[test]
    fn test_unknown_milestone_passes_through() {
        assert_eq!(status_from_milestone("held_at_customs"), "held_at_customs");
    }
}
