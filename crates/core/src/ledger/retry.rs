//! Retry policy for top-ups that lose an optimistic concurrency race.
//!
//! A conflict means another writer committed first, so retrying always
//! makes progress for the wallet as a whole. The policy bounds a single
//! call by elapsed time rather than by attempt count: a call keeps
//! retrying with jittered exponential backoff until its budget is spent.

use std::time::Duration;

/// Default time a top-up may spend retrying conflicts.
pub const DEFAULT_TOP_UP_RETRY_BUDGET: Duration = Duration::from_secs(5);

/// Bounded, jittered backoff for conflicting top-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total time a call may spend retrying.
    pub budget: Duration,
    /// Backoff ceiling for the first retry.
    pub initial_backoff: Duration,
    /// Largest backoff ceiling.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            budget: DEFAULT_TOP_UP_RETRY_BUDGET,
            initial_backoff: Duration::from_micros(500),
            max_backoff: Duration::from_millis(20),
        }
    }
}

impl RetryPolicy {
    /// Default backoff with a different time budget.
    #[must_use]
    pub fn with_budget(budget: Duration) -> Self {
        Self {
            budget,
            ..Self::default()
        }
    }

    /// Backoff ceiling before retry number `attempt` (1-based): the
    /// initial backoff doubled per attempt, capped at `max_backoff`.
    #[must_use]
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1_u32 << doublings)
            .min(self.max_backoff)
    }

    /// Randomized delay in `[0, backoff_ceiling(attempt)]`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ceiling = u64::try_from(self.backoff_ceiling(attempt).as_micros()).unwrap_or(u64::MAX);
        Duration::from_micros(rand::random_range(0..=ceiling))
    }
}
