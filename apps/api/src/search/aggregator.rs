//! Bulkhead fan-out: every (query, provider) pair runs as its own task under
//! one shared deadline. A failing or slow provider only costs its own slot.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::{JobPosting, ProviderResult, ProviderStatus, SearchQuery};
use crate::providers::{ProviderClient, ProviderError};
use crate::search::SearchError;

/// Merged output of one aggregate call.
#[derive(Debug, Default)]
pub struct AggregateResult {
    /// Postings from every successful call, in (query, provider) order.
    pub postings: Vec<JobPosting>,
    /// One entry per call that errored or missed the deadline.
    pub provider_errors: Vec<ProviderResult>,
}

type CallOutcome = Result<Result<Vec<JobPosting>, ProviderError>, JoinError>;

/// Runs every query against every provider concurrently and waits at most
/// `timeout` for the whole batch.
///
/// When the deadline fires, the shared cancellation token is cancelled and
/// any call still running is recorded as `Timeout`. Results that already
/// arrived are kept. Fails only if no call finished with `Ok`.
pub async fn aggregate(
    queries: &[SearchQuery],
    providers: &[Arc<dyn ProviderClient>],
    timeout: Duration,
) -> Result<AggregateResult, SearchError> {
    let cancel = CancellationToken::new();
    let mut labels: Vec<(String, String)> = Vec::with_capacity(queries.len() * providers.len());
    let mut in_flight = FuturesUnordered::new();

    for query in queries {
        for provider in providers {
            let slot = labels.len();
            labels.push((provider.source().to_string(), query.text.clone()));

            let provider = Arc::clone(provider);
            let query = query.clone();
            let cancel = cancel.clone();
            let handle = tokio::spawn(async move { provider.search(&query, &cancel).await });
            in_flight.push(handle.map(move |outcome| (slot, outcome)));
        }
    }

    let mut outcomes: Vec<Option<CallOutcome>> = (0..labels.len()).map(|_| None).collect();
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            next = in_flight.next() => match next {
                Some((slot, outcome)) => outcomes[slot] = Some(outcome),
                None => break,
            },
            _ = &mut deadline => {
                warn!(
                    "Aggregate deadline of {}ms reached with {} calls still running, cancelling",
                    timeout.as_millis(),
                    in_flight.len()
                );
                cancel.cancel();
                break;
            }
        }
    }
    // Dropping the handles detaches the remaining tasks; they stop on the token.
    drop(in_flight);

    let total_calls = labels.len();
    let mut any_ok = false;
    let mut result = AggregateResult::default();

    for ((source, query), outcome) in labels.into_iter().zip(outcomes) {
        match outcome {
            Some(Ok(Ok(postings))) => {
                any_ok = true;
                result.postings.extend(postings);
            }
            Some(Ok(Err(ProviderError::Timeout(msg)))) => {
                result
                    .provider_errors
                    .push(failed(source, query, ProviderStatus::Timeout, msg));
            }
            Some(Ok(Err(ProviderError::Permanent(msg)))) => {
                result
                    .provider_errors
                    .push(failed(source, query, ProviderStatus::Error, msg));
            }
            Some(Err(join_error)) => {
                warn!("{source} task for '{query}' did not complete: {join_error}");
                result.provider_errors.push(failed(
                    source,
                    query,
                    ProviderStatus::Error,
                    format!("provider task failed: {join_error}"),
                ));
            }
            None => {
                let msg = format!("no response before the {}ms deadline", timeout.as_millis());
                result
                    .provider_errors
                    .push(failed(source, query, ProviderStatus::Timeout, msg));
            }
        }
    }

    for err in &result.provider_errors {
        warn!(
            "Provider {} failed for '{}' ({:?}): {}",
            err.source,
            err.query,
            err.status,
            err.error.as_deref().unwrap_or("")
        );
    }

    if !any_ok {
        return Err(SearchError::AllProvidersFailed {
            errors: result.provider_errors,
        });
    }

    info!(
        "Aggregated {} postings from {} calls ({} failed)",
        result.postings.len(),
        total_calls,
        result.provider_errors.len()
    );
    Ok(result)
}

fn failed(source: String, query: String, status: ProviderStatus, error: String) -> ProviderResult {
    ProviderResult {
        source,
        query,
        status,
        postings: Vec::new(),
        error: Some(error),
    }
}
