use std::sync::Arc;

use crate::profiles::UserProfileStore;
use crate::search::JobSearchService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<JobSearchService>,
    /// Postgres-backed in production, swapped for an in-memory store in tests.
    pub profiles: Arc<dyn UserProfileStore>,
}
