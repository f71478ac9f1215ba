//! Retry policy for foreground probes.

use std::time::Duration;

use crate::config::RETRY_DELAY;

/// Fixed-delay retry policy.
///
/// `max_attempts = None` retries until the backend answers: a dormant
/// free-tier backend can take a minute or more to cold start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_attempts: Option<u32>,
    pub delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::unbounded(RETRY_DELAY)
    }
}

impl BackoffPolicy {
    #[must_use]
    pub const fn unbounded(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
        }
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Whether another attempt may follow `attempts_made` failures.
    #[must_use]
    pub fn allows_retry(&self, attempts_made: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts_made < max,
            None => true,
        }
    }
}
