//! Shared RapidAPI transport: auth headers, per-request timeout, retry with
//! exponential backoff, and cooperative cancellation.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::providers::ProviderError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Only 5xx and request timeouts retry.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub initial_backoff: Duration,
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor)
    }
}

/// One RapidAPI host plus the credentials and retry policy used to reach it.
#[derive(Clone)]
pub struct RapidApiTransport {
    client: Client,
    api_key: String,
    host: String,
    base_url: String,
    policy: RetryPolicy,
}

impl RapidApiTransport {
    pub fn new(api_key: String, host: &str, policy: RetryPolicy) -> Self {
        Self {
            client: Client::builder()
                .timeout(policy.request_timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            host: host.to_string(),
            base_url: format!("https://{host}"),
            policy,
        }
    }

    /// Sends requests to `base_url` instead of the public host (tests, proxies).
    /// The `x-rapidapi-host` header still names the real host.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// GETs `path` with `params` and returns the parsed JSON body.
    ///
    /// 5xx and request timeouts are retried up to `max_retries` times; any
    /// other non-success status fails immediately as permanent.
    pub async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut last_error: Option<ProviderError> = None;

        for attempt in 0..=self.policy.max_retries {
            if attempt > 0 {
                let delay = self.policy.backoff_for(attempt);
                warn!(
                    "{} attempt {} failed, retrying after {}ms...",
                    self.host,
                    attempt,
                    delay.as_millis()
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Err(cancelled(&self.host)),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let request = self
                .client
                .get(&url)
                .header("x-rapidapi-key", &self.api_key)
                .header("x-rapidapi-host", &self.host)
                .query(params)
                .send();

            let response = tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled(&self.host)),
                response = request => response,
            };

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    last_error = Some(ProviderError::Timeout(format!(
                        "{} did not respond within {}ms",
                        self.host,
                        self.policy.request_timeout.as_millis()
                    )));
                    continue;
                }
                Err(e) => {
                    return Err(ProviderError::Permanent(format!(
                        "{} request failed: {e}",
                        self.host
                    )))
                }
            };

            let status = response.status();

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("{} returned {}: {}", self.host, status, truncate(&body, 200));
                last_error = Some(status_error(&self.host, status, &body));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(status_error(&self.host, status, &body));
            }

            debug!("{} responded {} on attempt {}", self.host, status, attempt + 1);

            return response.json::<Value>().await.map_err(|e| {
                ProviderError::Permanent(format!("{} returned an unreadable body: {e}", self.host))
            });
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::Permanent(format!("{} failed without a response", self.host))
        }))
    }
}

fn cancelled(host: &str) -> ProviderError {
    ProviderError::Timeout(format!("{host} call cancelled at search deadline"))
}

fn status_error(host: &str, status: StatusCode, body: &str) -> ProviderError {
    ProviderError::Permanent(format!(
        "{host} returned {}: {}",
        status.as_u16(),
        truncate(body, 200)
    ))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
