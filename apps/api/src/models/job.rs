use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::profile::ExperienceLevel;

/// One provider-level search request. Derived from a `UserProfile`, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub location: String,
    /// Provider-side page, 1-based.
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: String,
}

/// A job posting in the common shape every provider maps into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    /// Provider-scoped identifier; only unique together with `source`.
    pub external_id: String,
    pub source: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub salary_range: Option<SalaryRange>,
    pub remote: bool,
    pub skills: BTreeSet<String>,
    pub apply_url: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub experience_level: Option<ExperienceLevel>,
}

/// A posting with its ranking outcome. `score = None` marks the unranked tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedJob {
    #[serde(flatten)]
    pub posting: JobPosting,
    pub score: Option<u8>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Ok,
    Error,
    Timeout,
}

/// Outcome of one (query, provider) call inside a single aggregate invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub source: String,
    pub query: String,
    pub status: ProviderStatus,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub postings: Vec<JobPosting>,
    pub error: Option<String>,
}

/// One page of ranked results returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<RankedJob>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}
