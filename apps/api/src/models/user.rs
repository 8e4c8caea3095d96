use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

use crate::models::profile::{ExperienceLevel, UserProfile};

/// A user's stored job preferences joined with their most recent parsed résumé.
/// Résumé columns are `None` when the user never uploaded one.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfileRow {
    pub id: Uuid,
    pub preferred_title: Option<String>,
    pub location: Option<String>,
    pub remote: bool,
    pub salary_min: Option<i64>,
    pub experience_level: Option<String>,
    pub preference_skills: Vec<String>,
    pub resume_skills: Option<Vec<String>>,
    pub resume_experience_level: Option<String>,
    pub suggested_titles: Option<Vec<String>>,
}

impl UserProfileRow {
    /// Merges preferences with résumé data. Résumé skills and level win when
    /// present; a missing preferred title falls back to the top suggested title.
    pub fn into_profile(self) -> UserProfile {
        let suggested_titles: Vec<String> = self
            .suggested_titles
            .unwrap_or_default()
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect();

        let skills = match self.resume_skills {
            Some(skills) if !skills.is_empty() => skills,
            _ => self.preference_skills,
        };

        let experience_level = self
            .resume_experience_level
            .or(self.experience_level)
            .and_then(|raw| match raw.parse::<ExperienceLevel>() {
                Ok(level) => Some(level),
                Err(e) => {
                    warn!("Ignoring stored experience level for user {}: {e}", self.id);
                    None
                }
            })
            .unwrap_or_default();

        let preferred_title = match self.preferred_title {
            Some(title) if !title.trim().is_empty() => title,
            _ => suggested_titles.first().cloned().unwrap_or_default(),
        };

        UserProfile {
            skills: skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            preferred_title,
            location: self.location.unwrap_or_default(),
            remote: self.remote,
            salary_min: self.salary_min,
            experience_level,
            suggested_titles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row() -> UserProfileRow {
        UserProfileRow {
            id: Uuid::new_v4(),
            preferred_title: Some("Backend Engineer".to_string()),
            location: Some("Berlin".to_string()),
            remote: false,
            salary_min: Some(70_000),
            experience_level: Some("mid".to_string()),
            preference_skills: vec!["Python".to_string()],
            resume_skills: None,
            resume_experience_level: None,
            suggested_titles: None,
        }
    }

    #[test]
    fn test_preferences_only() {
        let profile = make_row().into_profile();
        assert_eq!(profile.preferred_title, "Backend Engineer");
        assert_eq!(profile.experience_level, ExperienceLevel::Mid);
        assert!(profile.skills.contains("Python"));
        assert!(profile.suggested_titles.is_empty());
    }

    #[test]
    fn test_resume_overrides_skills_and_level() {
        let mut row = make_row();
        row.resume_skills = Some(vec!["Rust".to_string(), "Go".to_string()]);
        row.resume_experience_level = Some("senior".to_string());

        let profile = row.into_profile();
        assert_eq!(profile.experience_level, ExperienceLevel::Senior);
        assert!(profile.skills.contains("Rust"));
        assert!(!profile.skills.contains("Python"));
    }

    #[test]
    fn test_empty_resume_skills_keep_preferences() {
        let mut row = make_row();
        row.resume_skills = Some(vec![]);
        assert!(row.into_profile().skills.contains("Python"));
    }

    #[test]
    fn test_missing_title_uses_first_suggested_title() {
        let mut row = make_row();
        row.preferred_title = None;
        row.suggested_titles = Some(vec!["Data Engineer".to_string(), "ML Engineer".to_string()]);

        let profile = row.into_profile();
        assert_eq!(profile.preferred_title, "Data Engineer");
        assert_eq!(profile.suggested_titles.len(), 2);
    }

    #[test]
    fn test_unknown_level_falls_back_to_default() {
        let mut row = make_row();
        row.experience_level = Some("galactic".to_string());
        assert_eq!(row.into_profile().experience_level, ExperienceLevel::Associate);
    }
}
