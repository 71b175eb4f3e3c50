//! Retry policies and deadline-bounded work.
//!
//! [`RetryPolicy`] decides how often and how long to wait between reload
//! attempts. [`run_with_timeout`] runs one attempt on a worker thread and
//! gives up waiting for it after a deadline.
//!
//! Backoff uses fixed formulas without jitter, so tests can assert exact
//! delays.
//!
//! # Example
//!
//! ```
//! use pixgrid_loader::retry::{BackoffStrategy, RetryPolicy};
//! use web_time::Duration;
//!
//! let policy = RetryPolicy::new(2, BackoffStrategy::Exponential {
//!     base_ms: 500,
//!     max_ms: 8_000,
//! });
//! assert_eq!(policy.delay(0), Duration::from_millis(500));
//! assert_eq!(policy.delay(1), Duration::from_millis(1_000));
//! ```

#![forbid(unsafe_code)]

use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::{LoadError, Result};

/// Wait between attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Same delay every time.
    Fixed {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// `base_ms * 2^attempt`, capped at `max_ms`.
    Exponential {
        /// First delay in milliseconds.
        base_ms: u64,
        /// Cap in milliseconds.
        max_ms: u64,
    },
    /// `base_ms * (attempt + 1)`, capped at `max_ms`.
    Linear {
        /// Delay step in milliseconds.
        base_ms: u64,
        /// Cap in milliseconds.
        max_ms: u64,
    },
}

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = single attempt).
    pub max_retries: u32,
    /// Delay schedule.
    pub backoff: BackoffStrategy,
}

impl Default for RetryPolicy {
    /// Two retries, exponential from 500ms.
    fn default() -> Self {
        Self::exponential(2, 500)
    }
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_retries: u32, backoff: BackoffStrategy) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Exponential backoff from `base_ms`, capped at sixteen times the base.
    pub fn exponential(max_retries: u32, base_ms: u64) -> Self {
        Self::new(
            max_retries,
            BackoffStrategy::Exponential {
                base_ms,
                max_ms: base_ms.saturating_mul(16),
            },
        )
    }

    /// Single attempt.
    pub fn no_retry() -> Self {
        Self::new(0, BackoffStrategy::Fixed { delay_ms: 0 })
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay(&self, attempt: u32) -> Duration {
        let ms = match &self.backoff {
            BackoffStrategy::Fixed { delay_ms } => *delay_ms,
            BackoffStrategy::Exponential { base_ms, max_ms } => {
                let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
                base_ms.saturating_mul(factor).min(*max_ms)
            }
            BackoffStrategy::Linear { base_ms, max_ms } => base_ms
                .saturating_mul(u64::from(attempt) + 1)
                .min(*max_ms),
        };
        Duration::from_millis(ms)
    }

    /// Sum of every backoff delay.
    pub fn total_max_delay(&self) -> Duration {
        (0..self.max_retries).map(|i| self.delay(i)).sum()
    }
}

/// Run `work` on a worker thread, waiting at most `timeout` for its result.
///
/// On timeout the worker is abandoned, not killed: it keeps running until
/// `work` returns and its result is dropped. Pair this with a cancellation
/// token checked inside `work` so abandoned workers stop early.
pub fn run_with_timeout<T, F>(timeout: Duration, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("pixgrid-reload".into())
        .spawn(move || {
            let _ = tx.send(work());
        })
        .map_err(|e| LoadError::transient(format!("failed to spawn reload worker: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(LoadError::Timeout { after: timeout }),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(LoadError::transient("reload worker exited without a result"))
        }
    }
}
