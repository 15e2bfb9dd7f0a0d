//! Bounded-attempt retry loop with capped exponential backoff.
//!
//! Each transcription call runs through [`run_with_retry`]: the per-attempt
//! closure reports a classified [`AttemptOutcome`], and the loop decides
//! whether to stop, surface the error, or sleep and try again. Terminal
//! failures (bad credentials, missing endpoint, oversized payload) never
//! consume further attempts; only transient failures are retried.
//!
//! A caller-supplied cancellation token is checked between attempts and
//! before every backoff sleep. In-flight request cancellation is the
//! attempt's own job (each HTTP request carries the per-attempt timeout).

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::error::TranscribeError;

/// Attempt and timing bounds for one backend.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Time budget for a single attempt; expiry cancels the in-flight request.
    pub attempt_timeout: Duration,
    /// Base delay for exponential backoff.
    pub backoff_base: Duration,
    /// Upper bound on any single backoff delay.
    pub backoff_cap: Duration,
}

impl RetryPolicy {
    /// Delay to sleep after the given (1-based) failed attempt:
    /// `min(base * 2^attempt, cap)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.backoff_cap)
    }
}

/// Classified result of a single attempt.
pub enum AttemptOutcome<T> {
    /// The attempt produced a usable result.
    Success(T),
    /// A transient failure; another attempt may succeed.
    Retryable(TranscribeError),
    /// A failure that no retry can fix; surface it immediately.
    Terminal(TranscribeError),
}

impl<T> AttemptOutcome<T> {
    /// Classifies an error by its category's retryability.
    pub fn from_error(err: TranscribeError) -> Self {
        if err.is_retryable() {
            AttemptOutcome::Retryable(err)
        } else {
            AttemptOutcome::Terminal(err)
        }
    }
}

/// Runs `attempt_fn` up to `policy.max_attempts` times, sleeping a capped
/// exponential backoff between retryable failures.
///
/// Exhausting the budget surfaces the last classified error. Cancellation is
/// observed between attempts and interrupts backoff sleeps immediately.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut attempt_fn: F,
) -> Result<T, TranscribeError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptOutcome<T>>,
{
    let mut last_error = TranscribeError::Unknown("no attempts were made".to_string());

    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            tracing::info!("Transcription cancelled before attempt {attempt}");
            return Err(TranscribeError::Cancelled);
        }

        tracing::debug!("Transcription attempt {attempt}/{}", policy.max_attempts);

        match attempt_fn(attempt).await {
            AttemptOutcome::Success(value) => {
                if attempt > 1 {
                    tracing::info!("Transcription succeeded on attempt {attempt}");
                }
                return Ok(value);
            }
            AttemptOutcome::Terminal(err) => {
                tracing::warn!("Attempt {attempt} failed terminally: {err}");
                return Err(err);
            }
            AttemptOutcome::Retryable(err) => {
                tracing::warn!(
                    "Attempt {attempt}/{} failed: {err}",
                    policy.max_attempts
                );
                last_error = err;

                if attempt < policy.max_attempts {
                    let delay = policy.backoff_delay(attempt);
                    tracing::debug!("Backing off {}ms before next attempt", delay.as_millis());
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::info!("Transcription cancelled during backoff");
                            return Err(TranscribeError::Cancelled);
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    tracing::warn!(
        "Transcription failed after {} attempts: {last_error}",
        policy.max_attempts
    );
    Err(last_error)
}
