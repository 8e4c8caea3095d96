use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_PROVIDERS: &str = "jsearch,active_jobs,internships";
const MAX_PROVIDER_RETRIES: u32 = 10;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or a value is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rapidapi_key: String,
    /// Ranking runs heuristic-only when unset.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Provider names, in fan-out order.
    pub providers: Vec<String>,
    pub aggregate_timeout: Duration,
    pub ranking_timeout: Duration,
    pub provider_max_retries: u32,
    pub provider_backoff: Duration,
    pub provider_request_timeout: Duration,
    pub page_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            rapidapi_key: require_env("RAPIDAPI_KEY")?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            providers: parse_providers(
                &std::env::var("JOB_PROVIDERS").unwrap_or_else(|_| DEFAULT_PROVIDERS.to_string()),
            ),
            aggregate_timeout: Duration::from_millis(parse_env("AGGREGATE_TIMEOUT_MS", 8000)?),
            ranking_timeout: Duration::from_millis(parse_env("RANKING_TIMEOUT_MS", 5000)?),
            provider_max_retries: parse_env("PROVIDER_MAX_RETRIES", 2)?,
            provider_backoff: Duration::from_millis(parse_env("PROVIDER_BACKOFF_MS", 500)?),
            provider_request_timeout: Duration::from_millis(parse_env(
                "PROVIDER_REQUEST_TIMEOUT_MS",
                5000,
            )?),
            page_size: parse_env("PAGE_SIZE", 20)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.ranking_timeout >= self.aggregate_timeout {
            bail!(
                "RANKING_TIMEOUT_MS ({}) must be shorter than AGGREGATE_TIMEOUT_MS ({})",
                self.ranking_timeout.as_millis(),
                self.aggregate_timeout.as_millis()
            );
        }
        if self.provider_max_retries > MAX_PROVIDER_RETRIES {
            bail!(
                "PROVIDER_MAX_RETRIES ({}) must be at most {MAX_PROVIDER_RETRIES}",
                self.provider_max_retries
            );
        }
        if self.page_size == 0 {
            bail!("PAGE_SIZE must be at least 1");
        }
        if self.providers.is_empty() {
            bail!("JOB_PROVIDERS must name at least one provider");
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_providers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}
