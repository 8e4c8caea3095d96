// LLM prompt constants for job ranking.

/// System prompt for ranking. Append `llm_client::prompts::JSON_ONLY_SYSTEM`.
pub const RANKING_SYSTEM: &str = "You are an expert technical recruiter matching job postings \
    to a candidate profile. Score every posting honestly; do not inflate weak matches.";

/// Ranking prompt template.
/// Replace: {job_count}, {skills}, {experience_level}, {preferred_title},
///          {location}, {remote}, {jobs}
pub const RANKING_PROMPT_TEMPLATE: &str = r#"Rank these {job_count} jobs based on relevance to this user profile:

User Profile:
- Skills: {skills}
- Experience Level: {experience_level}
- Preferred Job Title: {preferred_title}
- Preferred Location: {location}
- Open to Remote: {remote}

Jobs to rank:
{jobs}

Return a JSON array with one entry per job you rank, scores are integers 0-100:
[
  {"job_index": 1, "score": 95, "reason": "Perfect match for skills and experience"},
  {"job_index": 3, "score": 87, "reason": "Good skill match, location preference"}
]

Rules:
1. `job_index` is the number shown before each job above (1-based)
2. `reason` is one short sentence a job seeker can read
3. Rank by: skill match (40%), experience level match (25%), location preference (20%), title fit (15%)"#;
