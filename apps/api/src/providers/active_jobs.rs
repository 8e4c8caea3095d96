//! Active Jobs DB (RapidAPI): postings scraped from company ATS career sites.
//!
//! Its record shape is shared with the internships feed, so the raw record and
//! mapping live here and `internships` reuses them.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::models::{ExperienceLevel, JobPosting, SearchQuery};
use crate::providers::{map_records, required, ProviderClient, ProviderError, RapidApiTransport};
use crate::search::skills::extract_skills;

pub const SOURCE: &str = "active_jobs";
pub const HOST: &str = "active-jobs-db.p.rapidapi.com";
const PATH: &str = "/active-ats-7d";

#[derive(Debug, Deserialize)]
pub(crate) struct FeedJob {
    id: Option<serde_json::Value>,
    title: Option<String>,
    organization: Option<String>,
    locations_derived: Option<Vec<String>>,
    url: Option<String>,
    date_posted: Option<String>,
    remote_derived: Option<bool>,
    description_text: Option<String>,
}

pub struct ActiveJobsProvider {
    transport: RapidApiTransport,
}

impl ActiveJobsProvider {
    pub fn new(transport: RapidApiTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ProviderClient for ActiveJobsProvider {
    fn source(&self) -> &str {
        SOURCE
    }

    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<JobPosting>, ProviderError> {
        let items = fetch_feed(&self.transport, PATH, query, cancel).await?;
        let postings = map_records(SOURCE, items, |raw: FeedJob| feed_posting(raw, SOURCE));
        debug!("{SOURCE}: {} postings for '{}'", postings.len(), query.text);
        Ok(postings)
    }
}

/// Both feeds filter server-side by title and location and return a bare array.
pub(crate) async fn fetch_feed(
    transport: &RapidApiTransport,
    path: &str,
    query: &SearchQuery,
    cancel: &CancellationToken,
) -> Result<Vec<serde_json::Value>, ProviderError> {
    let mut params = vec![
        ("title_filter", query.text.clone()),
        ("description_type", "text".to_string()),
        ("offset", (query.page.saturating_sub(1) * 100).to_string()),
    ];
    let location = query.location.trim();
    if !location.is_empty() && !location.eq_ignore_ascii_case("remote") {
        params.push(("location_filter", location.to_string()));
    }
    if location.eq_ignore_ascii_case("remote") {
        params.push(("remote", "true".to_string()));
    }

    let body = transport.get_json(path, &params, cancel).await?;
    match body {
        serde_json::Value::Array(items) => Ok(items),
        other => Err(ProviderError::Permanent(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

pub(crate) fn feed_posting(raw: FeedJob, source: &str) -> Option<JobPosting> {
    // Feed ids arrive as numbers or strings depending on the endpoint version.
    let external_id = match raw.id? {
        serde_json::Value::String(s) => required(Some(s))?,
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let title = required(raw.title)?;
    let company = required(raw.organization)?;
    let description = raw.description_text.unwrap_or_default();
    let remote = raw.remote_derived.unwrap_or(false);

    let location = raw
        .locations_derived
        .unwrap_or_default()
        .into_iter()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_else(|| if remote { "Remote".to_string() } else { String::new() });

    let skills = extract_skills(&format!("{title} {description}"));
    let experience_level = ExperienceLevel::infer_from_title(&title);

    Some(JobPosting {
        external_id,
        source: source.to_string(),
        title,
        company,
        location,
        description,
        salary_range: None,
        remote,
        skills,
        apply_url: raw.url.unwrap_or_default(),
        posted_at: raw.date_posted.as_deref().and_then(parse_posted_at),
        experience_level,
    })
}

/// Accepts RFC 3339 or the feed's zone-less `2026-09-01T12:00:00` form (UTC).
fn parse_posted_at(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
