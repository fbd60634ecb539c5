// SPDX-License-Identifier: Apache-2.0

//! Result polling policy.
//!
//! The analysis summary is fetched after a fixed wait. When that first poll
//! reports the retry status (500 by default) the pipeline waits a second,
//! longer fixed delay and polls exactly once more. There is no exponential
//! growth and no jitter.

use std::time::Duration;

use async_trait::async_trait;

/// Fixed delays and trigger status for result polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait between launching the analysis and the first poll.
    pub initial_delay: Duration,
    /// Wait between a transient first poll and the single retry.
    pub retry_delay: Duration,
    /// Status code that triggers the retry.
    pub retry_status: u16,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(15),
            retry_delay: Duration::from_secs(30),
            retry_status: 500,
        }
    }
}

impl PollPolicy {
    /// Determines if a transient poll status earns the single retry.
    ///
    /// Only an exact match with `retry_status` qualifies; every other
    /// non-success status is passed through untouched.
    #[must_use]
    pub fn should_retry(&self, status: u16) -> bool {
        status == self.retry_status
    }
}

/// Unconditional wait used between pipeline stages.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Waits for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
