mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod profiles;
mod providers;
mod routes;
mod search;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::profiles::PgUserProfileStore;
use crate::providers::build_providers;
use crate::routes::build_router;
use crate::search::llm_ranker::ClaudeRanker;
use crate::search::ranking::Ranker;
use crate::search::JobSearchService;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scout API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (profile store)
    let db = create_pool(&config.database_url)
        .await
        .context("Failed to connect to the profile database")?;

    // Initialize job providers
    let providers = build_providers(&config);
    if providers.is_empty() {
        anyhow::bail!("No known job providers in JOB_PROVIDERS: {:?}", config.providers);
    }
    info!(
        "Job providers: {}",
        providers.iter().map(|p| p.source()).collect::<Vec<_>>().join(", ")
    );

    // Initialize ranking (LLM when a key is configured, heuristic otherwise)
    let ranker = match &config.anthropic_api_key {
        Some(key) => {
            info!("LLM ranking enabled (model: {})", llm_client::MODEL);
            let llm = ClaudeRanker::new(LlmClient::new(key.clone()));
            Ranker::new(Some(Arc::new(llm)), config.ranking_timeout)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, ranking will use the heuristic only");
            Ranker::heuristic_only()
        }
    };

    let search = JobSearchService::new(
        providers,
        ranker,
        config.aggregate_timeout,
        config.page_size,
    );

    // Build app state
    let state = AppState {
        search: Arc::new(search),
        profiles: Arc::new(PgUserProfileStore::new(db)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
