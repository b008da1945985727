//! Fixed-interval polling of a remote task until it reaches a terminal
//! status.
//!
//! [`poll_until_terminal`] is independent of HTTP: it takes a closure that
//! performs one status fetch, which keeps the loop testable under a paused
//! tokio clock. [`TripoApi::await_completion`](crate::TripoApi::await_completion)
//! plugs the real fetch in.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::TripoError;
use crate::messages::{TaskResult, TaskStatus};

/// Polling budget for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Total time allowed before giving up.
    pub timeout: Duration,
    /// Delay between consecutive polls.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            interval: Duration::from_secs(5),
        }
    }
}

impl PollConfig {
    /// Upper bound on the number of polls a non-terminal task receives:
    /// `floor(timeout / interval)`, plus one boundary poll when the timeout
    /// is not a whole multiple of the interval.
    pub fn max_polls(&self) -> u32 {
        if self.interval.is_zero() {
            return u32::MAX;
        }
        let whole = self.timeout.as_nanos() / self.interval.as_nanos();
        let boundary = u128::from(self.timeout.as_nanos() % self.interval.as_nanos() != 0);
        u32::try_from(whole + boundary).unwrap_or(u32::MAX)
    }
}

/// Call `fetch` every `config.interval` until it reports a terminal status.
///
/// * `success` -- returns that poll's result unchanged.
/// * `failed`  -- returns [`TripoError::TaskFailed`] with the payload; no
///   further polls are made.
/// * any other status -- sleeps and polls again while the elapsed time is
///   below `config.timeout`, then returns [`TripoError::Timeout`].
///
/// An error from `fetch` is returned immediately.
pub async fn poll_until_terminal<F, Fut>(
    config: &PollConfig,
    mut fetch: F,
) -> Result<TaskResult, TripoError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TaskResult, TripoError>>,
{
    let started = Instant::now();
    let mut polls = 0u32;

    while started.elapsed() < config.timeout {
        polls += 1;
        let result = fetch().await?;

        match result.status() {
            TaskStatus::Success => {
                tracing::info!(polls, "Task succeeded");
                return Ok(result);
            }
            TaskStatus::Failed => {
                tracing::warn!(polls, "Task reported failure");
                return Err(TripoError::TaskFailed {
                    payload: result.into_payload(),
                });
            }
            status => {
                tracing::debug!(
                    polls,
                    ?status,
                    progress = result.progress(),
                    "Task still in progress",
                );
            }
        }

        tokio::time::sleep(config.interval).await;
    }

    tracing::warn!(
        polls,
        timeout_secs = config.timeout.as_secs(),
        "Task did not finish in time",
    );
    Err(TripoError::Timeout {
        timeout_secs: config.timeout.as_secs(),
        polls,
    })
}
