//! Exponential backoff for transient publish failures.

use std::time::Duration;

/// Retry policy configuration for exponential backoff.
///
/// Defaults match the gateway's fixed retry contract: up to 10 attempts,
/// starting at a 1 second delay, doubling each time, capped at 60 seconds.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of publish attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Growth factor applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Delay to wait before the retry numbered `attempt` (0-based: 0 is the
    /// first retry, i.e. the second overall attempt).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_delay_secs =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay_secs = base_delay_secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped_delay_secs)
    }

    /// Whether attempt number `attempt` (0-based, counting only retries) is
    /// still within the budget.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
