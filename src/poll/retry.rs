//! Bounded fixed-interval polling.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Default wait before the first attempt.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 100;
/// Default wait between attempts.
pub const DEFAULT_INTERVAL_MS: u64 = 500;
/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Timing for one polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// No sleeping at all. Used by tests against a local backend.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            initial_delay: Duration::ZERO,
            interval: Duration::ZERO,
            max_attempts,
        }
    }

    /// Worst-case wall time before the cycle gives up.
    pub fn total_budget(&self) -> Duration {
        self.initial_delay + self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// One attempt's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    Ready(T),
    Pending,
}

/// The attempt budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("gave up after {attempts} attempts")]
pub struct Exhausted {
    pub attempts: u32,
}

/// Sleep `initial_delay`, then call `attempt` up to `max_attempts` times,
/// sleeping `interval` between calls, until one returns `Ready`.
///
/// The closure receives the 1-based attempt number.
pub async fn poll_until<T, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> Result<T, Exhausted>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = PollStep<T>>,
{
    if !policy.initial_delay.is_zero() {
        tokio::time::sleep(policy.initial_delay).await;
    }

    for n in 1..=policy.max_attempts {
        if let PollStep::Ready(value) = attempt(n).await {
            return Ok(value);
        }
        if n < policy.max_attempts && !policy.interval.is_zero() {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(Exhausted {
        attempts: policy.max_attempts,
    })
}
