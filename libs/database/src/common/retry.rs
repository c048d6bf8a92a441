use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff for startup work against a database that may not be up yet.
///
/// The first retry waits `initial_delay`; each later wait doubles, capped at
/// `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    /// Five retries from 200ms, about six seconds in total
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(self, max_retries: u32) -> Self {
        Self {
            max_retries,
            ..self
        }
    }

    pub fn with_initial_delay(self, initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            ..self
        }
    }

    /// The wait before each retry, in order
    pub fn delays(self) -> impl Iterator<Item = Duration> {
        let max_delay = self.max_delay;
        std::iter::successors(Some(self.initial_delay.min(max_delay)), move |previous| {
            Some(previous.saturating_mul(2).min(max_delay))
        })
        .take(self.max_retries as usize)
    }
}

/// Run `operation` until it succeeds or the retries in `config` run out,
/// returning the last error in that case.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delays = config.delays();
    let mut attempt = 1;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Succeeded after retrying");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        let Some(delay) = delays.next() else {
            warn!(attempts = attempt, error = %err, "Giving up");
            return Err(err);
        };

        debug!(attempt, error = %err, delay_ms = delay.as_millis() as u64, "Attempt failed, retrying");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// [`retry_with_backoff`] with [`RetryConfig::default`]
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff(operation, RetryConfig::default()).await
}
