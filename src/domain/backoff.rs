//! Reconnect backoff policy.
//!
//! Linear backoff with a ceiling: `delay(attempt) = min(cap, attempt * step)`.

use std::time::Duration;

/// Default increment per failed attempt.
pub const DEFAULT_STEP: Duration = Duration::from_millis(1000);

/// Default ceiling for a single delay.
pub const DEFAULT_CAP: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    step: Duration,
    cap: Duration,
}

impl ReconnectPolicy {
    pub const fn new(step: Duration, cap: Duration) -> Self {
        Self { step, cap }
    }

    /// Delay before the `attempt`-th consecutive reconnection (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt).min(self.cap)
    }

    pub const fn step(&self) -> Duration {
        self.step
    }

    pub const fn cap(&self) -> Duration {
        self.cap
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_STEP, DEFAULT_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<u128> = (1..=7).map(|k| policy.delay(k).as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 3000, 4000, 5000, 5000, 5000]);
    }

    #[test]
    fn test_zero_attempt_is_immediate() {
        assert_eq!(ReconnectPolicy::default().delay(0), Duration::ZERO);
    }

    #[test]
    fn test_huge_attempt_saturates_at_cap() {
        let policy = ReconnectPolicy::new(Duration::from_secs(u64::MAX / 2), DEFAULT_CAP);
        assert_eq!(policy.delay(u32::MAX), DEFAULT_CAP);
    }
}
