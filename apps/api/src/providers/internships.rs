//! Internships feed (RapidAPI). Same record shape as Active Jobs DB, but every
//! posting is entry level regardless of title.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::models::{ExperienceLevel, JobPosting, SearchQuery};
use crate::providers::active_jobs::{feed_posting, fetch_feed, FeedJob};
use crate::providers::{map_records, ProviderClient, ProviderError, RapidApiTransport};

pub const SOURCE: &str = "internships";
pub const HOST: &str = "internships-api.p.rapidapi.com";
const PATH: &str = "/active-jb-7d";

pub struct InternshipsProvider {
    transport: RapidApiTransport,
}

impl InternshipsProvider {
    pub fn new(transport: RapidApiTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ProviderClient for InternshipsProvider {
    fn source(&self) -> &str {
        SOURCE
    }

    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<JobPosting>, ProviderError> {
        let items = fetch_feed(&self.transport, PATH, query, cancel).await?;
        let postings = map_records(SOURCE, items, |raw: FeedJob| {
            feed_posting(raw, SOURCE).map(|mut posting| {
                posting.experience_level = Some(ExperienceLevel::Entry);
                posting
            })
        });
        debug!("{SOURCE}: {} postings for '{}'", postings.len(), query.text);
        Ok(postings)
    }
}
