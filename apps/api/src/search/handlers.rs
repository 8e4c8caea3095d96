use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Page, UserProfile};
use crate::state::AppState;

fn default_page() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub profile: UserProfile,
    #[serde(default = "default_page")]
    pub page: u32,
}

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

/// POST /api/v1/jobs/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Page>, AppError> {
    let page = state.search.search(&req.profile, req.page).await?;
    Ok(Json(page))
}

/// GET /api/v1/jobs/recommendations/:user_id
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Page>, AppError> {
    let profile = state
        .profiles
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    info!(
        "Recommendations for {user_id}: {} skills, title '{}'",
        profile.skills.len(),
        profile.preferred_title
    );
    let page = state.search.search(&profile, params.page).await?;
    Ok(Json(page))
}
