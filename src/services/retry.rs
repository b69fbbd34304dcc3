//! Retry policy for transient create-intent failures.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Bounded exponential backoff with jitter, plus the cool-down applied after
/// the budget is exhausted.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_retries: u32,
    pub jitter_cap: Duration,
    pub cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(2000),
            max_retries: 3,
            jitter_cap: Duration::from_millis(1000),
            cooldown: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn has_budget(&self, retry_count: u32) -> bool {
        retry_count < self.max_retries
    }

    /// Pure delay computation: `base * 2^attempt + jitter`, with `attempt`
    /// 0-indexed. Jitter is passed in so tests can assert exact bounds.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .saturating_mul(factor)
            .saturating_add(jitter.min(self.jitter_cap))
    }
}

/// Jitter sampled from sub-second system time. Spreads concurrent retries
/// well enough; not a cryptographic source.
pub fn sample_jitter(cap: Duration) -> Duration {
    let cap_ms = cap.as_millis() as u64;
    if cap_ms == 0 {
        return Duration::ZERO;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let mixed = nanos.wrapping_mul(1103515245).wrapping_add(12345);
    Duration::from_millis(u64::from(mixed) % cap_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_per_attempt_without_jitter() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_with_jitter(0, Duration::ZERO),
            Duration::from_millis(2000)
        );
        assert_eq!(
            policy.delay_with_jitter(1, Duration::ZERO),
            Duration::from_millis(4000)
        );
        assert_eq!(
            policy.delay_with_jitter(2, Duration::ZERO),
            Duration::from_millis(8000)
        );
    }

    #[test]
    fn sampled_delay_stays_within_jitter_bounds() {
        let policy = RetryPolicy::default();
        for attempt in 0..3 {
            let base = Duration::from_millis(2000 * (1 << attempt));
            let delay = policy.delay_with_jitter(attempt, sample_jitter(policy.jitter_cap));
            assert!(delay >= base, "attempt {}: {:?} < {:?}", attempt, delay, base);
            assert!(
                delay < base + Duration::from_millis(1000),
                "attempt {}: {:?} out of bounds",
                attempt,
                delay
            );
        }
    }

    #[test]
    fn jitter_larger_than_cap_is_clamped() {
        let policy = RetryPolicy::default();
        let delay = policy.delay_with_jitter(0, Duration::from_secs(10));
        assert_eq!(delay, Duration::from_millis(3000));
    }

    #[test]
    fn budget_allows_exactly_max_retries() {
        let policy = RetryPolicy::default();
        assert!(policy.has_budget(0));
        assert!(policy.has_budget(2));
        assert!(!policy.has_budget(3));
    }

    #[test]
    fn sample_jitter_respects_cap() {
        for _ in 0..32 {
            let jitter = sample_jitter(Duration::from_millis(1000));
            assert!(jitter < Duration::from_millis(1000));
        }
        assert_eq!(sample_jitter(Duration::ZERO), Duration::ZERO);
    }
}
