pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::search::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/jobs/search", post(handlers::handle_search))
        .route(
            "/api/v1/jobs/recommendations/:user_id",
            get(handlers::handle_recommendations),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::errors::AppError;
    use crate::models::{JobPosting, SearchQuery, UserProfile};
    use crate::profiles::UserProfileStore;
    use crate::providers::{ProviderClient, ProviderError};
    use crate::search::ranking::Ranker;
    use crate::search::JobSearchService;

    struct StubProvider {
        fail: bool,
    }

    #[async_trait]
    impl ProviderClient for StubProvider {
        fn source(&self) -> &str {
            "stub"
        }

        async fn search(
            &self,
            query: &SearchQuery,
            _cancel: &CancellationToken,
        ) -> Result<Vec<JobPosting>, ProviderError> {
            if self.fail {
                return Err(ProviderError::Permanent("stub returned 503".to_string()));
            }
            Ok(vec![JobPosting {
                external_id: query.text.clone(),
                source: "stub".to_string(),
                title: format!("{} role", query.text),
                company: "Acme".to_string(),
                location: "Remote".to_string(),
                description: String::new(),
                salary_range: None,
                remote: true,
                skills: BTreeSet::from(["rust".to_string()]),
                apply_url: "https://acme.example/1".to_string(),
                posted_at: None,
                experience_level: None,
            }])
        }
    }

    struct MemoryProfiles(HashMap<Uuid, UserProfile>);

    #[async_trait]
    impl UserProfileStore for MemoryProfiles {
        async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
            Ok(self.0.get(&user_id).cloned())
        }
    }

    fn rust_profile() -> UserProfile {
        UserProfile {
            skills: BTreeSet::from(["Rust".to_string()]),
            preferred_title: "Rust Engineer".to_string(),
            remote: true,
            ..Default::default()
        }
    }

    fn app(fail: bool, users: HashMap<Uuid, UserProfile>) -> Router {
        let search = JobSearchService::new(
            vec![Arc::new(StubProvider { fail }) as Arc<dyn ProviderClient>],
            Ranker::heuristic_only(),
            Duration::from_secs(2),
            20,
        );
        build_router(AppState {
            search: Arc::new(search),
            profiles: Arc::new(MemoryProfiles(users)),
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn search_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/jobs/search")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(false, HashMap::new()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "scout-api");
    }

    #[tokio::test]
    async fn test_search_returns_ranked_page() {
        let request = search_request(json!({"profile": rust_profile(), "page": 1}));
        let (status, body) = send(app(false, HashMap::new()), request).await;

        assert_eq!(status, StatusCode::OK);
        // "Rust Engineer" and "Rust developer" queries give two distinct titles
        assert_eq!(body["total"], 2);
        assert_eq!(body["page"], 1);
        assert_eq!(body["items"][0]["title"], "Rust Engineer role");
        assert!(body["items"][0]["score"].as_u64().unwrap() <= 100);
        assert!(body["items"][0]["reason"].is_string());
    }

    #[tokio::test]
    async fn test_search_with_empty_profile_is_400() {
        let request = search_request(json!({"profile": {}}));
        let (status, body) = send(app(false, HashMap::new()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PROFILE");
    }

    #[tokio::test]
    async fn test_search_page_out_of_bounds_is_empty_not_an_error() {
        for page in [0, 9] {
            let request = search_request(json!({"profile": rust_profile(), "page": page}));
            let (status, body) = send(app(false, HashMap::new()), request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["page"], page);
            assert_eq!(body["total"], 2);
            assert!(body["items"].as_array().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_all_providers_failing_is_502_with_details() {
        let request = search_request(json!({"profile": rust_profile()}));
        let (status, body) = send(app(true, HashMap::new()), request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "ALL_PROVIDERS_FAILED");
        assert_eq!(body["error"]["details"][0]["status"], "error");
    }

    #[tokio::test]
    async fn test_recommendations_for_known_user() {
        let user_id = Uuid::new_v4();
        let users = HashMap::from([(user_id, rust_profile())]);
        let request = Request::get(format!("/api/v1/jobs/recommendations/{user_id}?page=1"))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app(false, users), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
    }

    #[tokio::test]
    async fn test_recommendations_for_unknown_user_is_404() {
        let request = Request::get(format!("/api/v1/jobs/recommendations/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(false, HashMap::new()), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
