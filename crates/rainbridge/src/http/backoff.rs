//! Exponential backoff with proportional jitter.

use rand::Rng;
use std::time::Duration;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Upper bound of the jitter term as a fraction of the exponential delay.
const JITTER_RATIO: f64 = 0.1;

/// Computes retry delays as `base * 2^attempt` plus up to 10% jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base: Duration,
}

impl BackoffPolicy {
    /// Create a policy with the given base delay.
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// The deterministic part of the delay: `base * 2^attempt`, saturating.
    pub fn exponential(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(0);
        if factor == 0 {
            return Duration::MAX;
        }
        self.base.saturating_mul(factor)
    }

    /// Delay before retry number `attempt` (0 = first retry).
    ///
    /// The result lies in `[base * 2^n, 1.1 * base * 2^n]`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponential = self.exponential(attempt);
        let fraction: f64 = rand::thread_rng().gen_range(0.0..=JITTER_RATIO);
        let jitter = Duration::try_from_secs_f64(exponential.as_secs_f64() * fraction)
            .unwrap_or(Duration::ZERO);
        exponential.saturating_add(jitter)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY)
    }
}
