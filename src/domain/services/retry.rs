use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};
use crate::config::Config;
use crate::error::AppError;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 50;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.store_max_retries,
            initial_backoff: Duration::from_millis(config.store_initial_backoff_ms),
        }
    }
}

/// Re-runs `op` while it fails with `AppError::Transient`, doubling the pause each time.
/// Only use for operations that are safe to repeat (reads).
pub async fn retry_transient<T, F, Fut>(policy: RetryPolicy, op_name: &str, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut retries = 0;
    let mut backoff = policy.initial_backoff;

    loop {
        match op().await {
            Err(e) if e.is_transient() => {
                if retries >= policy.max_retries {
                    error!("{} failed after {} retries: {}", op_name, retries, e);
                    return Err(e);
                }
                warn!("{} hit a transient failure. Retrying in {}ms... {}", op_name, backoff.as_millis(), e);
            }
            other => return other,
        }

        sleep(backoff).await;
        retries += 1;
        backoff *= 2;
    }
}
