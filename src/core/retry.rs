//! # Retry Policy
//!
//! Fixed-interval polling with an attempt ceiling. The check operation is a
//! parameter so the policy can be tested without a backend.
//!
//! ```text
//! wait(interval) → check() → terminal? ──yes──▶ PollSuccess
//!        ▲                      │ no / Err
//!        └──── attempts < max ◀─┘
//!                  │ exhausted
//!                  ▼
//!             PollTimeout
//! ```
//!
//! A failed check is logged and counts as a non-terminal attempt.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// The terminal value plus how many checks it took.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSuccess<T> {
    pub value: T,
    pub attempts: u32,
}

/// Attempt budget exhausted. `last` is the last successful check, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct PollTimeout<T> {
    pub attempts: u32,
    pub last: Option<T>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Polls `check` until `is_terminal` accepts a result.
    ///
    /// Waits `interval` before every attempt, including the first. `check`
    /// receives the 1-based attempt number. Never calls `check` more than
    /// `max_attempts` times.
    pub async fn poll_until<T, E, F, Fut, P>(
        &self,
        mut check: F,
        is_terminal: P,
    ) -> Result<PollSuccess<T>, PollTimeout<T>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        P: Fn(&T) -> bool,
    {
        let mut last = None;

        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;

            match check(attempt).await {
                Ok(value) if is_terminal(&value) => {
                    debug!("Poll attempt {}/{} reached a terminal result", attempt, self.max_attempts);
                    return Ok(PollSuccess {
                        value,
                        attempts: attempt,
                    });
                }
                Ok(value) => {
                    debug!("Poll attempt {}/{}: not done yet", attempt, self.max_attempts);
                    last = Some(value);
                }
                Err(e) => {
                    warn!("Poll attempt {}/{} failed: {}", attempt, self.max_attempts, e);
                }
            }
        }

        warn!("Polling gave up after {} attempts", self.max_attempts);
        Err(PollTimeout {
            attempts: self.max_attempts,
            last,
        })
    }
}
