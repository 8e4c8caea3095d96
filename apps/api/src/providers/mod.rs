//! Job-data providers: one `ProviderClient` per external source.
//!
//! Every provider maps its native response into `JobPosting` and classifies
//! failures as either permanent or timeout; nothing provider-specific leaks
//! past this boundary. Carried in the search service as `Arc<dyn ProviderClient>`.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::Config;
use crate::models::{JobPosting, SearchQuery};

pub mod active_jobs;
pub mod http;
pub mod internships;
pub mod jsearch;

pub use active_jobs::ActiveJobsProvider;
pub use http::{RapidApiTransport, RetryPolicy};
pub use internships::InternshipsProvider;
pub use jsearch::JSearchProvider;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Not worth retrying: 4xx, retries exhausted on 5xx, or an unreadable body.
    #[error("{0}")]
    Permanent(String),

    /// The call ran out of time, or the search deadline cancelled it.
    #[error("timed out: {0}")]
    Timeout(String),
}

#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Stable source label stamped on every posting, e.g. "jsearch".
    fn source(&self) -> &str;

    /// Runs one search. Must return promptly once `cancel` fires.
    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<JobPosting>, ProviderError>;
}

/// Maps each raw item with `map`, dropping (and logging) the ones that are
/// malformed. One bad record never fails the whole call.
pub(crate) fn map_records<R, F>(source: &str, items: Vec<serde_json::Value>, map: F) -> Vec<JobPosting>
where
    R: serde::de::DeserializeOwned,
    F: Fn(R) -> Option<JobPosting>,
{
    let total = items.len();
    let postings: Vec<JobPosting> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<R>(item) {
            Ok(raw) => {
                let posting = map(raw);
                if posting.is_none() {
                    warn!("{source}: dropping record {i} with missing required fields");
                }
                posting
            }
            Err(e) => {
                warn!("{source}: dropping malformed record {i}: {e}");
                None
            }
        })
        .collect();

    if postings.len() < total {
        warn!("{source}: kept {} of {} records", postings.len(), total);
    }
    postings
}

/// Returns `Some(trimmed)` when the field is present and non-blank.
pub(crate) fn required(field: Option<String>) -> Option<String> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Builds the providers named in `config.providers`, in that order.
/// Unknown names are logged and skipped.
pub fn build_providers(config: &Config) -> Vec<Arc<dyn ProviderClient>> {
    let policy = RetryPolicy {
        max_retries: config.provider_max_retries,
        initial_backoff: config.provider_backoff,
        request_timeout: config.provider_request_timeout,
    };

    config
        .providers
        .iter()
        .filter_map(|name| -> Option<Arc<dyn ProviderClient>> {
            match name.as_str() {
                jsearch::SOURCE => Some(Arc::new(JSearchProvider::new(
                    RapidApiTransport::new(
                        config.rapidapi_key.clone(),
                        jsearch::HOST,
                        policy.clone(),
                    ),
                ))),
                active_jobs::SOURCE => Some(Arc::new(ActiveJobsProvider::new(
                    RapidApiTransport::new(
                        config.rapidapi_key.clone(),
                        active_jobs::HOST,
                        policy.clone(),
                    ),
                ))),
                internships::SOURCE => Some(Arc::new(InternshipsProvider::new(
                    RapidApiTransport::new(
                        config.rapidapi_key.clone(),
                        internships::HOST,
                        policy.clone(),
                    ),
                ))),
                other => {
                    warn!("Unknown job provider '{other}' in JOB_PROVIDERS, skipping");
                    None
                }
            }
        })
        .collect()
}
