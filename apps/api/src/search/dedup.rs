use std::collections::HashSet;

use tracing::debug;

use crate::models::JobPosting;

/// Normalized identity of a posting across providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub title: String,
    pub company: String,
    pub location: String,
}

impl DedupKey {
    pub fn of(posting: &JobPosting) -> Self {
        Self {
            title: normalize(&posting.title),
            company: normalize(&posting.company),
            location: normalize(&posting.location),
        }
    }
}

/// Lowercases, strips punctuation, and collapses whitespace.
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes duplicate postings, keeping the first occurrence of each.
///
/// Two postings are duplicates when their normalized (title, company, location)
/// match, or when the same provider returned the same native id twice (e.g.
/// once per query).
pub fn dedupe(postings: Vec<JobPosting>) -> Vec<JobPosting> {
    let input_len = postings.len();
    let mut seen_keys: HashSet<DedupKey> = HashSet::with_capacity(input_len);
    let mut seen_ids: HashSet<(String, String)> = HashSet::with_capacity(input_len);

    let unique: Vec<JobPosting> = postings
        .into_iter()
        .filter(|posting| {
            let key = DedupKey::of(posting);
            let native_id = (posting.source.clone(), posting.external_id.clone());
            if seen_keys.contains(&key) || seen_ids.contains(&native_id) {
                return false;
            }
            seen_keys.insert(key);
            seen_ids.insert(native_id);
            true
        })
        .collect();

    debug!("Dedup kept {} of {} postings", unique.len(), input_len);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn posting(source: &str, id: &str, title: &str, company: &str, location: &str) -> JobPosting {
        JobPosting {
            external_id: id.to_string(),
            source: source.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            description: String::new(),
            salary_range: None,
            remote: false,
            skills: BTreeSet::new(),
            apply_url: String::new(),
            posted_at: None,
            experience_level: None,
        }
    }

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("  Acme, Inc. "), "acme inc");
        assert_eq!(normalize("Sr. Go-Developer"), "sr go developer");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_same_normalized_key_across_providers_keeps_first() {
        let input = vec![
            posting("jsearch", "a-1", "Go Developer", "Acme Inc.", "Remote"),
            posting("active_jobs", "99", "go developer", "ACME INC", " remote "),
        ];
        let out = dedupe(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, "jsearch");
    }

    #[test]
    fn test_same_native_id_from_same_provider_is_duplicate() {
        let input = vec![
            posting("jsearch", "a-1", "Go Developer", "Acme", "Remote"),
            posting("jsearch", "a-1", "Go Developer (Backend)", "Acme", "Remote"),
        ];
        assert_eq!(dedupe(input).len(), 1);
    }

    #[test]
    fn test_same_native_id_from_different_providers_is_not_duplicate() {
        let input = vec![
            posting("jsearch", "1", "Go Developer", "Acme", "Remote"),
            posting("internships", "1", "SQL Analyst", "Initech", "Austin"),
        ];
        assert_eq!(dedupe(input).len(), 2);
    }

    #[test]
    fn test_preserves_first_seen_order() {
        let input = vec![
            posting("a", "1", "Zeta", "C", "L"),
            posting("a", "2", "Alpha", "C", "L"),
            posting("b", "3", "zeta", "c", "l"),
            posting("a", "4", "Mid", "C", "L"),
        ];
        let titles: Vec<String> = dedupe(input).into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe(vec![]).is_empty());
    }

    #[test]
    fn test_output_is_subset_of_input_and_never_longer() {
        let input = vec![
            posting("a", "1", "Go Developer", "Acme", "Remote"),
            posting("b", "1", "Go Developer", "Acme", "Remote"),
            posting("b", "2", "SQL Analyst", "Acme", "Remote"),
            posting("a", "1", "Other", "Other", "Other"),
            posting("c", "7", "SQL  Analyst!", "acme", "REMOTE"),
        ];
        let out = dedupe(input.clone());
        assert!(out.len() <= input.len());
        assert!(out.iter().all(|p| input.contains(p)));
        // Every normalized key appears exactly once in the output
        let keys: HashSet<DedupKey> = out.iter().map(DedupKey::of).collect();
        assert_eq!(keys.len(), out.len());
        assert_eq!(out.len(), 2);
    }
}
