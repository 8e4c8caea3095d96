//! Skill extraction from free text, used when a provider ships no skills list.

use std::collections::BTreeSet;

/// Common technical skills, matched case-insensitively on token boundaries.
const SKILL_VOCABULARY: &[&str] = &[
    "python", "javascript", "java", "react", "node.js", "sql", "aws", "docker",
    "kubernetes", "git", "html", "css", "mongodb", "postgresql", "redis",
    "machine learning", "data science", "tensorflow", "pytorch", "pandas",
    "numpy", "scikit-learn", "angular", "vue.js", "typescript", "go", "rust",
    "c++", "c#", "php", "ruby", "swift", "kotlin", "flutter", "django",
    "flask", "spring", "express", "fastapi", "graphql", "rest api", "kafka",
    "terraform", "linux", "azure", "gcp",
];

/// Returns every vocabulary skill that appears in `text`.
///
/// A match must sit on token boundaries so "go" does not fire on "google"
/// and "java" does not fire on "javascript".
pub fn extract_skills(text: &str) -> BTreeSet<String> {
    let haystack = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| contains_token(&haystack, skill))
        .map(|skill| skill.to_string())
        .collect()
}

fn contains_token(haystack: &str, needle: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '+' || c == '#';
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        // A trailing '.' is sentence punctuation unless another word follows it.
        let after_ok = match after {
            None => true,
            Some('.') => !haystack[start + needle.len() + 1..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric),
            Some(c) => !is_word(c),
        };
        before.map_or(true, |c| !is_word(c) && c != '.') && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_known_skills() {
        let skills = extract_skills("We use Rust, PostgreSQL and Docker on AWS.");
        assert!(skills.contains("rust"));
        assert!(skills.contains("postgresql"));
        assert!(skills.contains("docker"));
        assert!(skills.contains("aws"));
    }

    #[test]
    fn test_token_boundaries() {
        let skills = extract_skills("Join Google to write JavaScript");
        assert!(!skills.contains("go"));
        assert!(!skills.contains("java"));
        assert!(skills.contains("javascript"));
    }

    #[test]
    fn test_symbol_skills() {
        let skills = extract_skills("Experience with C++ and C# required. Node.js a plus.");
        assert!(skills.contains("c++"));
        assert!(skills.contains("c#"));
        assert!(skills.contains("node.js"));
    }

    #[test]
    fn test_skill_at_sentence_end() {
        assert!(extract_skills("Our backend is written in Go.").contains("go"));
    }

    #[test]
    fn test_multi_word_skill() {
        assert!(extract_skills("Applied Machine Learning team").contains("machine learning"));
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_skills("").is_empty());
    }
}
