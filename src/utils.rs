use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::warn;

/// Retry policy: delays grow along the Fibonacci sequence starting at `initial_delay`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub initial_delay: Duration,
    pub max_retries: usize,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_retries: 5,
        }
    }
}

/// Runs `operation` until it succeeds or the policy's retries are used up.
///
/// Used for startup calls such as table provisioning, where DynamoDB can
/// report the table as still being created for a while.
pub async fn retry_with_backoff<T, E, Fut, F>(
    label: &str,
    mut operation: F,
    backoff: Backoff,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    let mut retries = 0;
    let mut fib = (backoff.initial_delay, backoff.initial_delay);

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if retries < backoff.max_retries => {
                warn!(
                    "{} failed: {:?}. Retrying in {:?} (attempt {}/{})",
                    label,
                    e,
                    fib.0,
                    retries + 1,
                    backoff.max_retries
                );
                sleep(fib.0).await;
                retries += 1;
                fib = (fib.1, fib.0 + fib.1);
            }
            Err(e) => return Err(e),
        }
    }
}
