use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::models::{Page, UserProfile};
use crate::providers::ProviderClient;
use crate::search::aggregator::aggregate;
use crate::search::assembler::assemble;
use crate::search::dedup::dedupe;
use crate::search::query::synthesize;
use crate::search::ranking::Ranker;
use crate::search::SearchError;

/// Runs the full pipeline for one profile:
/// synthesize → aggregate → dedupe → rank → assemble.
///
/// Built once at startup and shared through `AppState`. Holds only read-only
/// collaborators, so concurrent searches never share working state.
pub struct JobSearchService {
    providers: Vec<Arc<dyn ProviderClient>>,
    ranker: Ranker,
    aggregate_timeout: Duration,
    page_size: u32,
}

impl JobSearchService {
    pub fn new(
        providers: Vec<Arc<dyn ProviderClient>>,
        ranker: Ranker,
        aggregate_timeout: Duration,
        page_size: u32,
    ) -> Self {
        Self {
            providers,
            ranker,
            aggregate_timeout,
            page_size,
        }
    }

    pub async fn search(&self, profile: &UserProfile, page: u32) -> Result<Page, SearchError> {
        let queries = synthesize(profile)?;
        info!(
            "Searching {} providers with {} queries: {:?}",
            self.providers.len(),
            queries.len(),
            queries.iter().map(|q| q.text.as_str()).collect::<Vec<_>>()
        );

        let aggregated = aggregate(&queries, &self.providers, self.aggregate_timeout).await?;
        let raw_count = aggregated.postings.len();
        let unique = dedupe(aggregated.postings);
        info!(
            "{} unique postings from {} raw ({} provider calls failed)",
            unique.len(),
            raw_count,
            aggregated.provider_errors.len()
        );

        let ranked = self.ranker.rank(unique, profile).await;
        Ok(assemble(ranked, page, self.page_size))
    }
}
