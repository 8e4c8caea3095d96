use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Seniority band shared by user preferences, résumé analysis, and postings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    #[default]
    Associate,
    Mid,
    Senior,
    Director,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Associate => "associate",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Director => "director",
        }
    }

    /// Guesses the level from title keywords ("Senior Rust Engineer" → Senior).
    /// Returns `None` when the title carries no seniority signal.
    pub fn infer_from_title(title: &str) -> Option<Self> {
        let words: Vec<String> = title
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        let has = |needle: &str| words.iter().any(|w| w == needle);

        if has("director") || has("head") || has("vp") || has("principal") {
            Some(ExperienceLevel::Director)
        } else if has("senior") || has("sr") || has("lead") || has("staff") {
            Some(ExperienceLevel::Senior)
        } else if has("intern") || has("internship") || has("graduate") || has("trainee") {
            Some(ExperienceLevel::Entry)
        } else if has("junior") || has("jr") || has("associate") {
            Some(ExperienceLevel::Associate)
        } else if has("mid") || has("ii") || has("intermediate") {
            Some(ExperienceLevel::Mid)
        } else {
            None
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entry" => Ok(ExperienceLevel::Entry),
            "associate" => Ok(ExperienceLevel::Associate),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            "director" => Ok(ExperienceLevel::Director),
            other => Err(format!("unknown experience level '{other}'")),
        }
    }
}

/// Read-only snapshot of what a job seeker is looking for.
///
/// Built either from an inbound request or by `UserProfileStore`, which merges
/// stored preferences with résumé-derived skills and suggested titles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub preferred_title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    /// Résumé-suggested titles, best first.
    #[serde(default)]
    pub suggested_titles: Vec<String>,
}

impl UserProfile {
    pub fn has_title(&self) -> bool {
        !self.preferred_title.trim().is_empty()
    }

    /// Skills lowercased and trimmed, for case-insensitive comparisons.
    pub fn normalized_skills(&self) -> BTreeSet<String> {
        self.skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
