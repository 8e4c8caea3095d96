//! LLM-backed scoring. `Ranker` holds an `Option<Arc<dyn LlmRanker>>` and falls
//! back to the heuristic whenever this path yields nothing usable.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::{JobPosting, UserProfile};
use crate::search::prompts::{RANKING_PROMPT_TEMPLATE, RANKING_SYSTEM};

const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// One model-assigned score, keyed by the posting's 0-based input index.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmScore {
    pub score: u8,
    pub reason: String,
}

#[async_trait]
pub trait LlmRanker: Send + Sync {
    /// Scores `postings` against `profile`. Indices in the returned map are
    /// 0-based positions in `postings`; the caller discards any out of range.
    async fn score(
        &self,
        postings: &[JobPosting],
        profile: &UserProfile,
    ) -> Result<BTreeMap<usize, LlmScore>, LlmError>;
}

/// Wire shape the model is asked to return.
#[derive(Debug, Deserialize)]
struct RankingEntry {
    #[serde(alias = "jobIndex")]
    job_index: i64,
    score: f64,
    #[serde(default)]
    reason: String,
}

/// Ranks with Claude through the shared `LlmClient`.
pub struct ClaudeRanker {
    client: LlmClient,
}

impl ClaudeRanker {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LlmRanker for ClaudeRanker {
    async fn score(
        &self,
        postings: &[JobPosting],
        profile: &UserProfile,
    ) -> Result<BTreeMap<usize, LlmScore>, LlmError> {
        let prompt = build_prompt(postings, profile);
        let system = format!("{RANKING_SYSTEM}\n\n{JSON_ONLY_SYSTEM}");

        let entries: Vec<RankingEntry> = self.client.call_json(&prompt, &system).await?;
        debug!("LLM returned {} ranking entries for {} postings", entries.len(), postings.len());
        Ok(into_scores(entries))
    }
}

/// Converts 1-based prompt indices to 0-based ones. Non-positive indices are
/// dropped, scores are clamped to 0–100, and the first entry for an index wins.
fn into_scores(entries: Vec<RankingEntry>) -> BTreeMap<usize, LlmScore> {
    let mut scores = BTreeMap::new();
    for entry in entries {
        let Some(index) = usize::try_from(entry.job_index)
            .ok()
            .and_then(|i| i.checked_sub(1))
        else {
            warn!("Ignoring ranking entry with job_index {}", entry.job_index);
            continue;
        };
        scores.entry(index).or_insert(LlmScore {
            score: entry.score.round().clamp(0.0, 100.0) as u8,
            reason: entry.reason.trim().to_string(),
        });
    }
    scores
}

fn build_prompt(postings: &[JobPosting], profile: &UserProfile) -> String {
    let jobs = postings
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let skills = p.skills.iter().cloned().collect::<Vec<_>>().join(", ");
            format!(
                "{}. {} at {}\n   Location: {}{}\n   Skills: {}\n   Description: {}",
                i + 1,
                p.title,
                p.company,
                or_not_specified(&p.location),
                if p.remote { " (remote)" } else { "" },
                if skills.is_empty() { "Not specified".to_string() } else { skills },
                preview(&p.description),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let skills = profile.skills.iter().cloned().collect::<Vec<_>>().join(", ");

    let job_count = postings.len().to_string();
    render(
        RANKING_PROMPT_TEMPLATE,
        &[
            ("job_count", job_count.as_str()),
            ("skills", or_not_specified(&skills)),
            ("experience_level", profile.experience_level.as_str()),
            ("preferred_title", or_not_specified(profile.preferred_title.trim())),
            ("location", or_not_specified(profile.location.trim())),
            ("remote", if profile.remote { "yes" } else { "no" }),
            ("jobs", jobs.as_str()),
        ],
    )
}

/// Fills `{name}` placeholders in one pass; substituted text is never rescanned.
/// Braces that do not name a variable are copied as-is.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let var = vars.iter().find(|(name, _)| {
            after
                .strip_prefix(*name)
                .is_some_and(|tail| tail.starts_with('}'))
        });
        match var {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn preview(description: &str) -> String {
    let mut chars = description.chars();
    let head: String = chars.by_ref().take(DESCRIPTION_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn or_not_specified(value: &str) -> &str {
    if value.is_empty() {
        "Not specified"
    } else {
        value
    }
}
