//! Retry policy for upstream calls: bounded attempts with exponential
//! backoff and jitter. The state transitions are pure so the policy is
//! testable without a clock; only the driver sleeps.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::ProviderError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, first try included.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles for each attempt after.
    pub base_delay: Duration,
    /// Randomize each delay by +/-50% so callers sharing an outage do not
    /// retry in lockstep.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            jitter: true,
        }
    }
}

/// Where a call stands after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Wait out the backoff for this attempt index, then try again.
    Backoff(u32),
    /// A failure retrying cannot fix; surface it as-is.
    Fatal,
    /// Transient failures used up every attempt.
    Exhausted,
}

impl RetryPolicy {
    /// Transition after 0-based attempt `attempt` failed with `error`.
    pub fn after_failure(&self, attempt: u32, error: &ProviderError) -> RetryState {
        if !error.is_transient() {
            RetryState::Fatal
        } else if attempt + 1 >= self.max_attempts {
            RetryState::Exhausted
        } else {
            RetryState::Backoff(attempt)
        }
    }

    /// Backoff before retrying after attempt `attempt`: base * 2^attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let scaled = self.base_delay.saturating_mul(1 << attempt.min(16));
        if !self.jitter {
            return scaled;
        }
        let millis = scaled.as_millis() as u64;
        let spread = millis / 2;
        Duration::from_millis(millis - spread + fastrand::u64(0..=spread * 2))
    }
}

/// Runs `operation` under `policy`. Transient failures are retried with
/// backoff; anything else returns immediately.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => match policy.after_failure(attempt, &error) {
                RetryState::Backoff(n) => {
                    let delay = policy.delay(n);
                    debug!(
                        attempt = attempt + 1,
                        max = policy.max_attempts,
                        ?delay,
                        %error,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryState::Fatal | RetryState::Exhausted => return Err(error),
            },
        }
    }
}
