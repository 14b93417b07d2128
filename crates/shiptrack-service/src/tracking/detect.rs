//! Status change detection.
//!
//! A change is "detected" when a refresh yields a status different from the
//! store's last-known value for that shipment. Comparison is
//! case-insensitive because carriers are inconsistent about casing and a
//! pure case flip is not a change worth notifying about.

use shiptrack_entity::shipment::status::same_status;

/// Outcome of comparing a stored status against a freshly polled one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// No change; the stored value stands.
    Unchanged,
    /// The status changed to the contained value.
    Changed(String),
}

/// Compares a stored status with a polled one.
pub fn detect_change(stored: &str, polled: &str) -> Detection {
    if same_status(stored, polled) {
        Detection::Unchanged
    } else {
        Detection::Changed(polled.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_status_unchanged() {
        assert_eq!(detect_change("In Transit", "In Transit"), Detection::Unchanged);
    }

    #[test]
    fn test_case_only_difference_unchanged() {
        assert_eq!(detect_change("in transit", "In Transit"), Detection::Unchanged);
        assert_eq!(detect_change("DELIVERED", "Delivered"), Detection::Unchanged);
    }

    #[test]
    fn test_real_change_detected() {
        assert_eq!(
            detect_change("In Transit", "Delivered"),
            Detection::Changed("Delivered".to_string())
        );
    }

    #[test]
    fn test_change_from_initial_status() {
        assert_eq!(
            detect_change("Processing", "In Transit"),
            Detection::Changed("In Transit".to_string())
        );
    }
}
