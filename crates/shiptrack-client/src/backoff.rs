//! Reconnect backoff schedule.

use std::time::Duration;

use shiptrack_core::config::client::ClientConfig;

/// Capped exponential backoff with a fixed retry budget.
///
/// The first delay is the base; each subsequent delay doubles until the cap.
/// Once the budget is exhausted `next_delay` returns `None` and the caller
/// must stop retrying.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    base: Duration,
    max: Duration,
    max_attempts: u32,
    attempt: u32,
}

impl ReconnectBackoff {
    pub fn new(base: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            max,
            max_attempts,
            attempt: 0,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            Duration::from_millis(config.reconnect_base_delay_ms),
            Duration::from_millis(config.reconnect_max_delay_ms),
            config.max_reconnect_attempts,
        )
    }

    /// Returns the delay before the next attempt, or `None` when the retry
    /// budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        let exp = self.base.saturating_mul(1u32 << self.attempt.min(31));
        self.attempt += 1;
        Some(exp.min(self.max))
    }

    /// Number of attempts consumed so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Resets the schedule after a successful connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backoff() -> ReconnectBackoff {
        ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(30), 5)
    }

    #[test]
    fn test_schedule_doubles_until_cap() {
        let mut b = ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(30), 10);
        let delays: Vec<u64> = std::iter::from_fn(|| b.next_delay())
            .map(|d| d.as_secs())
            .collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30, 30, 30, 30, 30]);
    }

    #[test]
    fn test_budget_exhaustion() {
        let mut b = backoff();
        for _ in 0..5 {
            assert!(b.next_delay().is_some());
        }
        assert_eq!(b.next_delay(), None);
        assert_eq!(b.next_delay(), None);
        assert_eq!(b.attempts(), 5);
    }

    #[test]
    fn test_reset_restarts_schedule() {
        let mut b = backoff();
        b.next_delay();
        b.next_delay();
        b.reset();
        assert_eq!(b.next_delay(), Some(Duration::from_secs(1)));
    }
}
