use std::fmt::Display;
use std::time::Duration;

/// Attempts made to resolve the session identity before giving up.
pub const DEFAULT_SESSION_READY_ATTEMPTS: u32 = 5;
/// Fixed pause between attempts.
pub const DEFAULT_SESSION_READY_DELAY_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_SESSION_READY_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_SESSION_READY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Runs `op` until it succeeds or the policy's attempts are used up,
/// sleeping a fixed delay in between. The last error is returned.
pub async fn retry_with_delay<T, E, F>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(error) if attempt >= attempts => {
                tracing::warn!(what, attempts, %error, "giving up after retries");
                return Err(error);
            }
            Err(error) => {
                tracing::debug!(what, attempt, %error, "not ready; retrying after delay");
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
