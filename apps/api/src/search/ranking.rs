//! Ranker: orders deduplicated postings for one profile.
//!
//! Primary path: an `LlmRanker` under its own timeout. When that is missing,
//! slow, failing, or returns nothing usable, the deterministic heuristic below
//! scores every posting instead. Callers never see a ranking error.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::models::{ExperienceLevel, JobPosting, RankedJob, UserProfile};
use crate::search::dedup::normalize;
use crate::search::llm_ranker::{LlmRanker, LlmScore};
use crate::search::query::FALLBACK_ROLE;

// Heuristic weights; they sum to 1.0.
const SKILL_WEIGHT: f64 = 0.40;
const LEVEL_WEIGHT: f64 = 0.25;
const LOCATION_WEIGHT: f64 = 0.20;
const TITLE_WEIGHT: f64 = 0.15;

const UNSCORED_REASON: &str = "Not scored by the ranking model";

pub struct Ranker {
    llm: Option<Arc<dyn LlmRanker>>,
    llm_timeout: Duration,
}

impl Ranker {
    pub fn new(llm: Option<Arc<dyn LlmRanker>>, llm_timeout: Duration) -> Self {
        Self { llm, llm_timeout }
    }

    /// A ranker that never calls an LLM.
    pub fn heuristic_only() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Returns a permutation of `postings`, best first.
    pub async fn rank(&self, postings: Vec<JobPosting>, profile: &UserProfile) -> Vec<RankedJob> {
        if postings.is_empty() {
            return Vec::new();
        }

        match self.llm_scores(&postings, profile).await {
            Some(scores) => {
                info!("Ranked {} postings with LLM ({} scored)", postings.len(), scores.len());
                order_by_llm(postings, scores)
            }
            None => {
                info!("Ranked {} postings with heuristic", postings.len());
                rank_heuristic(postings, profile)
            }
        }
    }

    /// `None` means ranking degraded to the heuristic; the reason is logged.
    async fn llm_scores(
        &self,
        postings: &[JobPosting],
        profile: &UserProfile,
    ) -> Option<BTreeMap<usize, LlmScore>> {
        let llm = self.llm.as_ref()?;

        let scores = match tokio::time::timeout(self.llm_timeout, llm.score(postings, profile)).await {
            Ok(Ok(scores)) => scores,
            Ok(Err(e)) => {
                warn!("Ranking degraded to heuristic: LLM call failed: {e}");
                return None;
            }
            Err(_) => {
                warn!(
                    "Ranking degraded to heuristic: LLM did not answer within {}ms",
                    self.llm_timeout.as_millis()
                );
                return None;
            }
        };

        let returned = scores.len();
        let valid: BTreeMap<usize, LlmScore> = scores
            .into_iter()
            .filter(|(index, _)| *index < postings.len())
            .collect();
        if valid.len() < returned {
            warn!("Dropped {} LLM scores with out-of-range indices", returned - valid.len());
        }
        if valid.is_empty() {
            warn!("Ranking degraded to heuristic: LLM returned no usable scores");
            return None;
        }
        Some(valid)
    }
}

/// Scored postings by descending score (ties keep input order), then every
/// posting the model skipped, in input order with no score.
fn order_by_llm(postings: Vec<JobPosting>, scores: BTreeMap<usize, LlmScore>) -> Vec<RankedJob> {
    let mut slots: Vec<Option<JobPosting>> = postings.into_iter().map(Some).collect();

    let mut scored: Vec<(usize, LlmScore)> = scores.into_iter().collect();
    scored.sort_by(|a, b| b.1.score.cmp(&a.1.score));

    let mut ranked = Vec::with_capacity(slots.len());
    for (index, LlmScore { score, reason }) in scored {
        if let Some(posting) = slots.get_mut(index).and_then(Option::take) {
            ranked.push(RankedJob {
                posting,
                score: Some(score),
                reason,
            });
        }
    }
    ranked.extend(slots.into_iter().flatten().map(|posting| RankedJob {
        posting,
        score: None,
        reason: UNSCORED_REASON.to_string(),
    }));
    ranked
}

fn rank_heuristic(postings: Vec<JobPosting>, profile: &UserProfile) -> Vec<RankedJob> {
    let mut ranked: Vec<RankedJob> = postings
        .into_iter()
        .map(|posting| {
            let (score, reason) = heuristic_score(&posting, profile);
            RankedJob {
                posting,
                score: Some(score),
                reason,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

// ────────────────────────────────────────────────────────────────────────────
// Heuristic scoring
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic 0–100 score plus a short explanation of what matched.
///
/// 40% skill overlap (Jaccard), 25% experience level, 20% location or remote,
/// 15% target title found in the posting title (see `title_matches`).
pub fn heuristic_score(posting: &JobPosting, profile: &UserProfile) -> (u8, String) {
    let wanted = profile.normalized_skills();
    let offered: BTreeSet<String> = posting
        .skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    let shared: Vec<&String> = wanted.intersection(&offered).collect();
    let union = wanted.union(&offered).count();
    let skill_overlap = if union == 0 {
        0.0
    } else {
        shared.len() as f64 / union as f64
    };

    let posting_level = posting
        .experience_level
        .or_else(|| ExperienceLevel::infer_from_title(&posting.title));
    let level_match = posting_level == Some(profile.experience_level);
    let location_match = location_matches(posting, profile);
    let title_match = title_matches(posting, profile);

    let raw = SKILL_WEIGHT * skill_overlap
        + LEVEL_WEIGHT * f64::from(u8::from(level_match))
        + LOCATION_WEIGHT * f64::from(u8::from(location_match))
        + TITLE_WEIGHT * f64::from(u8::from(title_match.is_some()));
    let score = (raw * 100.0).round().clamp(0.0, 100.0) as u8;

    let mut reasons = Vec::new();
    if !shared.is_empty() {
        let names: Vec<&str> = shared.iter().map(|s| s.as_str()).collect();
        reasons.push(format!("Skills match: {}", names.join(", ")));
    }
    if level_match {
        reasons.push(format!("{} level", profile.experience_level));
    }
    if location_match {
        if profile.remote && posting.remote {
            reasons.push("remote".to_string());
        } else {
            reasons.push(format!("located in {}", posting.location));
        }
    }
    if let Some(target) = title_match {
        reasons.push(format!("title matches \"{target}\""));
    }
    let reason = if reasons.is_empty() {
        "Weak match on skills, level, location and title".to_string()
    } else {
        reasons.join("; ")
    };

    (score, reason)
}

fn location_matches(posting: &JobPosting, profile: &UserProfile) -> bool {
    if profile.remote && posting.remote {
        return true;
    }
    let wanted = normalize(&profile.location);
    let offered = normalize(&posting.location);
    !wanted.is_empty()
        && !offered.is_empty()
        && (offered.contains(&wanted) || wanted.contains(&offered))
}

/// Returns the title the posting matched, if any.
///
/// The target is the preferred title, else the first suggested title, else the
/// skills-only role (`<skill> developer`) the query synthesizer searches for.
fn title_matches(posting: &JobPosting, profile: &UserProfile) -> Option<String> {
    let title = posting.title.to_lowercase();

    let explicit = Some(profile.preferred_title.trim())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            profile
                .suggested_titles
                .iter()
                .map(|t| t.trim())
                .find(|t| !t.is_empty())
        });
    if let Some(wanted) = explicit {
        return title.contains(&wanted.to_lowercase()).then(|| wanted.to_string());
    }

    let words = format!(" {} ", normalize(&title));
    if !words.contains(&format!(" {FALLBACK_ROLE} ")) {
        return None;
    }
    profile
        .skills
        .iter()
        .map(|s| normalize(s))
        .filter(|s| !s.is_empty())
        .find(|s| words.contains(&format!(" {s} ")))
        .map(|skill| format!("{skill} {FALLBACK_ROLE}"))
}
