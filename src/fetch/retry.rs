use anyhow::Result;
use std::time::Duration;
use tracing::warn;

use super::client::HttpClient;
use super::fetch_bytes;

/// Bounded retry with exponential backoff. The default makes a single
/// attempt and surfaces the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, initial_backoff: Duration) -> Self {
        Self {
            retries,
            initial_backoff,
        }
    }

    /// Delay before retry number `attempt` (zero-based): the initial backoff
    /// doubled once per earlier retry.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff.saturating_mul(factor)
    }
}

/// [`fetch_bytes`] with up to `policy.retries` further attempts.
pub async fn fetch_with_retry<C: HttpClient>(
    client: &C,
    url: &str,
    policy: RetryPolicy,
) -> Result<Vec<u8>> {
    let mut attempt = 0;

    loop {
        match fetch_bytes(client, url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) if attempt < policy.retries => {
                let delay = policy.delay(attempt);
                attempt += 1;
                warn!(
                    url,
                    attempt,
                    retries = policy.retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return Err(e.context(format!(
                    "GET {url} failed after {} attempt(s)",
                    attempt + 1
                )));
            }
        }
    }
}
