//! JSearch (RapidAPI): free-text job search aggregated from Google for Jobs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::models::{ExperienceLevel, JobPosting, SalaryRange, SearchQuery};
use crate::providers::{map_records, required, ProviderClient, ProviderError, RapidApiTransport};
use crate::search::skills::extract_skills;

pub const SOURCE: &str = "jsearch";
pub const HOST: &str = "jsearch.p.rapidapi.com";

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    job_id: Option<String>,
    job_title: Option<String>,
    employer_name: Option<String>,
    job_location: Option<String>,
    job_city: Option<String>,
    job_state: Option<String>,
    job_country: Option<String>,
    job_description: Option<String>,
    job_is_remote: Option<bool>,
    job_apply_link: Option<String>,
    job_posted_at_datetime_utc: Option<String>,
    job_min_salary: Option<f64>,
    job_max_salary: Option<f64>,
    job_salary_currency: Option<String>,
    job_required_skills: Option<Vec<String>>,
}

pub struct JSearchProvider {
    transport: RapidApiTransport,
}

impl JSearchProvider {
    pub fn new(transport: RapidApiTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ProviderClient for JSearchProvider {
    fn source(&self) -> &str {
        SOURCE
    }

    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<JobPosting>, ProviderError> {
        let params = [
            ("query", search_text(query)),
            ("page", query.page.max(1).to_string()),
            ("num_pages", "1".to_string()),
            ("country", "us".to_string()),
            ("date_posted", "all".to_string()),
        ];

        let body = self.transport.get_json("/search", &params, cancel).await?;
        let envelope: SearchEnvelope = serde_json::from_value(body).map_err(|e| {
            ProviderError::Permanent(format!("{SOURCE} response missing `data` array: {e}"))
        })?;

        let postings = map_records(SOURCE, envelope.data, into_posting);
        debug!("{SOURCE}: {} postings for '{}'", postings.len(), query.text);
        Ok(postings)
    }
}

/// JSearch takes a single free-text query; location goes inline.
fn search_text(query: &SearchQuery) -> String {
    if query.location.trim().is_empty() {
        format!("{} jobs", query.text)
    } else {
        format!("{} jobs in {}", query.text, query.location.trim())
    }
}

fn into_posting(raw: RawJob) -> Option<JobPosting> {
    let external_id = required(raw.job_id)?;
    let title = required(raw.job_title)?;
    let company = required(raw.employer_name)?;
    let description = raw.job_description.unwrap_or_default();
    let remote = raw.job_is_remote.unwrap_or(false);

    let location = required(raw.job_location).unwrap_or_else(|| {
        [raw.job_city, raw.job_state, raw.job_country]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    });
    let location = if location.is_empty() && remote {
        "Remote".to_string()
    } else {
        location
    };

    let salary_range = match (raw.job_min_salary, raw.job_max_salary) {
        (None, None) => None,
        (min, max) => Some(SalaryRange {
            min,
            max,
            currency: raw.job_salary_currency.unwrap_or_else(|| "USD".to_string()),
        }),
    };

    let skills = match raw.job_required_skills {
        Some(skills) if !skills.is_empty() => skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => extract_skills(&format!("{title} {description}")),
    };

    let experience_level = ExperienceLevel::infer_from_title(&title);
    let posted_at = raw
        .job_posted_at_datetime_utc
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Some(JobPosting {
        external_id,
        source: SOURCE.to_string(),
        title,
        company,
        location,
        description,
        salary_range,
        remote,
        skills,
        apply_url: raw.job_apply_link.unwrap_or_default(),
        posted_at,
        experience_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::RetryPolicy;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn provider(server: &MockServer) -> JSearchProvider {
        let policy = RetryPolicy {
            max_retries: 0,
            initial_backoff: Duration::from_millis(1),
            request_timeout: Duration::from_secs(2),
        };
        JSearchProvider::new(
            RapidApiTransport::new("key".to_string(), HOST, policy).with_base_url(server.base_url()),
        )
    }

    fn query() -> SearchQuery {
        SearchQuery {
            text: "Go Developer".to_string(),
            location: "Remote".to_string(),
            page: 1,
        }
    }

    #[tokio::test]
    async fn test_maps_jsearch_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("query", "Go Developer jobs in Remote")
                .query_param("num_pages", "1");
            then.status(200).json_body(json!({
                "status": "OK",
                "data": [{
                    "job_id": "abc==",
                    "job_title": "Senior Go Developer",
                    "employer_name": "Acme",
                    "job_city": "Austin",
                    "job_state": "TX",
                    "job_country": "US",
                    "job_description": "Build services in Go and PostgreSQL.",
                    "job_is_remote": false,
                    "job_apply_link": "https://acme.example/apply",
                    "job_posted_at_datetime_utc": "2026-09-01T12:00:00.000Z",
                    "job_min_salary": 120000.0,
                    "job_max_salary": 150000.0,
                    "job_salary_currency": null,
                    "job_required_skills": null
                }]
            }));
        });

        let postings = provider(&server)
            .search(&query(), &CancellationToken::new())
            .await
            .unwrap();

        mock.assert();
        assert_eq!(postings.len(), 1);
        let p = &postings[0];
        assert_eq!(p.external_id, "abc==");
        assert_eq!(p.source, SOURCE);
        assert_eq!(p.location, "Austin, TX, US");
        assert_eq!(p.experience_level, Some(ExperienceLevel::Senior));
        assert!(p.skills.contains("go"));
        assert!(p.skills.contains("postgresql"));
        let salary = p.salary_range.as_ref().unwrap();
        assert_eq!(salary.currency, "USD");
        assert_eq!(salary.min, Some(120000.0));
        assert!(p.posted_at.is_some());
    }

    #[tokio::test]
    async fn test_drops_records_missing_required_fields() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(json!({
                "data": [
                    {"job_id": "1", "job_title": "Go Developer", "employer_name": "Acme", "job_is_remote": true},
                    {"job_id": "2", "job_title": "No Company"},
                    {"job_title": "No Id", "employer_name": "Acme"}
                ]
            }));
        });

        let postings = provider(&server)
            .search(&query(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].location, "Remote");
        assert!(postings[0].remote);
    }

    #[tokio::test]
    async fn test_missing_data_array_is_empty_result() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(json!({"status": "OK"}));
        });

        let postings = provider(&server)
            .search(&query(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(postings.is_empty());
    }

    #[tokio::test]
    async fn test_non_object_body_is_permanent_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(json!("rate limit page"));
        });

        let result = provider(&server)
            .search(&query(), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ProviderError::Permanent(_))));
    }

    #[test]
    fn test_search_text_without_location() {
        let q = SearchQuery {
            text: "Data Analyst".to_string(),
            location: " ".to_string(),
            page: 1,
        };
        assert_eq!(search_text(&q), "Data Analyst jobs");
    }
}
