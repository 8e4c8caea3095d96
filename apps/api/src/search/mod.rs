// Job search pipeline.
// Flow: profile → query synthesis → provider fan-out → dedup → ranking → page.
// All provider HTTP goes through `providers`; all LLM calls go through `llm_client`.

pub mod aggregator;
pub mod assembler;
pub mod dedup;
pub mod handlers;
pub mod llm_ranker;
pub mod prompts;
pub mod query;
pub mod ranking;
pub mod service;
pub mod skills;

use thiserror::Error;

use crate::models::ProviderResult;

/// The only failures that halt a search. Everything else degrades to a
/// smaller or heuristically ranked result set.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("All providers failed ({} calls)", errors.len())]
    AllProvidersFailed { errors: Vec<ProviderResult> },
}

pub use service::JobSearchService;
