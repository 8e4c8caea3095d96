//! Query synthesis: turns a `UserProfile` into provider search queries.
//!
//! Pure and deterministic: the same profile always yields the same ordered list.

use crate::models::{SearchQuery, UserProfile};
use crate::search::SearchError;

/// Upper bound on queries per search; each query fans out to every provider.
pub const MAX_QUERIES: usize = 3;

/// Role noun appended to the skills-only fallback query.
pub(crate) const FALLBACK_ROLE: &str = "developer";

/// Builds up to `MAX_QUERIES` queries ordered by specificity:
/// 1. preferred title
/// 2. top résumé-suggested title
/// 3. first two skills + role
///
/// Fails only when the profile has neither a title nor any skill.
pub fn synthesize(profile: &UserProfile) -> Result<Vec<SearchQuery>, SearchError> {
    let skills: Vec<&str> = profile
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if !profile.has_title() && skills.is_empty() {
        return Err(SearchError::InvalidProfile(
            "profile needs a preferred title or at least one skill".to_string(),
        ));
    }

    let location = profile.location.trim().to_string();
    let mut queries: Vec<SearchQuery> = Vec::with_capacity(MAX_QUERIES);

    let mut push = |text: String| {
        let text = collapse_whitespace(&text);
        if text.is_empty() || queries.len() >= MAX_QUERIES {
            return;
        }
        if queries.iter().any(|q| q.text.eq_ignore_ascii_case(&text)) {
            return;
        }
        queries.push(SearchQuery {
            text,
            location: location.clone(),
            page: 1,
        });
    };

    if profile.has_title() {
        push(profile.preferred_title.clone());
    }

    if let Some(suggested) = profile
        .suggested_titles
        .iter()
        .find(|t| !t.trim().is_empty())
    {
        push(suggested.clone());
    }

    if !skills.is_empty() {
        let top: Vec<&str> = skills.iter().take(2).copied().collect();
        push(format!("{} {FALLBACK_ROLE}", top.join(" ")));
    }

    Ok(queries)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(title: &str, skills: &[&str], suggested: &[&str]) -> UserProfile {
        UserProfile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            preferred_title: title.to_string(),
            location: "Remote".to_string(),
            remote: true,
            suggested_titles: suggested.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_profile_yields_three_queries_in_specificity_order() {
        let p = profile("Backend Engineer", &["Go", "SQL", "Kafka"], &["Platform Engineer"]);
        let queries = synthesize(&p).unwrap();

        let texts: Vec<&str> = queries.iter().map(|q| q.text.as_str()).collect();
        // BTreeSet orders skills alphabetically: Go, Kafka, SQL
        assert_eq!(
            texts,
            vec!["Backend Engineer", "Platform Engineer", "Go Kafka developer"]
        );
        assert!(queries.iter().all(|q| q.location == "Remote" && q.page == 1));
    }

    #[test]
    fn test_skills_only_profile() {
        let queries = synthesize(&profile("", &["Go", "SQL"], &[])).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].text, "Go SQL developer");
    }

    #[test]
    fn test_title_only_profile() {
        let queries = synthesize(&profile("Data Analyst", &[], &[])).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].text, "Data Analyst");
    }

    #[test]
    fn test_empty_profile_is_invalid() {
        let result = synthesize(&profile("   ", &[], &["Software Developer"]));
        assert!(matches!(result, Err(SearchError::InvalidProfile(_))));
    }

    #[test]
    fn test_suggested_title_equal_to_preferred_is_skipped() {
        let p = profile("Rust Engineer", &["Rust"], &["rust engineer", "Systems Engineer"]);
        let texts: Vec<String> = synthesize(&p).unwrap().into_iter().map(|q| q.text).collect();
        assert_eq!(texts, vec!["Rust Engineer", "Rust developer"]);
    }

    #[test]
    fn test_never_more_than_max_queries() {
        let p = profile("A", &["B", "C"], &["D", "E", "F"]);
        assert!(synthesize(&p).unwrap().len() <= MAX_QUERIES);
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let p = profile("Backend Engineer", &["SQL", "Go", "Docker"], &["SRE"]);
        let first = synthesize(&p).unwrap();
        for _ in 0..10 {
            assert_eq!(synthesize(&p).unwrap(), first);
        }
    }

    #[test]
    fn test_title_whitespace_is_collapsed() {
        let queries = synthesize(&profile("  Senior   Go  Developer ", &[], &[])).unwrap();
        assert_eq!(queries[0].text, "Senior Go Developer");
    }
}
