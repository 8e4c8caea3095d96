//! Read-only access to stored job seekers. Carried in `AppState` as
//! `Arc<dyn UserProfileStore>` so handlers can be tested without Postgres.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserProfileRow;
use crate::models::UserProfile;

#[async_trait]
pub trait UserProfileStore: Send + Sync {
    /// Preferences merged with the latest parsed résumé. `None` for unknown users.
    async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;
}

pub struct PgUserProfileStore {
    db: PgPool,
}

impl PgUserProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserProfileStore for PgUserProfileStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let row: Option<UserProfileRow> = sqlx::query_as(
            r#"
            SELECT
                u.id,
                p.preferred_title,
                p.location,
                COALESCE(p.remote, false) AS remote,
                p.salary_min,
                p.experience_level,
                COALESCE(p.skills, '{}'::text[]) AS preference_skills,
                r.skills AS resume_skills,
                r.experience_level AS resume_experience_level,
                r.suggested_titles
            FROM users u
            LEFT JOIN job_preferences p ON p.user_id = u.id
            LEFT JOIN LATERAL (
                SELECT skills, experience_level, suggested_titles
                FROM resumes
                WHERE user_id = u.id
                ORDER BY created_at DESC
                LIMIT 1
            ) r ON true
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(UserProfileRow::into_profile))
    }
}
