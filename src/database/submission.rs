use crate::error::app_error::AppError;
use crate::models::submission::{Submission, SubmissionRequest};
use chrono::Utc;
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;
use uuid::Uuid;

/// Where student assignment submissions are kept. Chosen once at startup.
#[async_trait::async_trait]
pub trait SubmissionStore: Send + Sync {
    fn name(&self) -> &'static str;
    async fn submit(&self, student_id: &Uuid, request: &SubmissionRequest) -> Result<Submission, AppError>;
    async fn list_for_student(&self, student_id: &Uuid) -> Result<Vec<Submission>, AppError>;
}

pub type SharedSubmissionStore = Arc<dyn SubmissionStore>;

/// Rows in `assignment_submissions`.
pub struct TableSubmissionStore {
    pub pool: PgPool,
}

/// JSON array in `profiles.submissions`, for deployments without the table.
pub struct ProfileJsonSubmissionStore {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl SubmissionStore for TableSubmissionStore {
    fn name(&self) -> &'static str {
        "assignment_submissions table"
    }

    async fn submit(&self, student_id: &Uuid, request: &SubmissionRequest) -> Result<Submission, AppError> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO assignment_submissions (student_id, assignment_id, content, attachment_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, student_id, assignment_id, content, attachment_url, submitted_at
            "#,
        )
        .bind(student_id)
        .bind(request.assignment_id)
        .bind(&request.content)
        .bind(&request.attachment_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(submission)
    }

    async fn list_for_student(&self, student_id: &Uuid) -> Result<Vec<Submission>, AppError> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"
            SELECT id, student_id, assignment_id, content, attachment_url, submitted_at
            FROM assignment_submissions
            WHERE student_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }
}

#[async_trait::async_trait]
impl SubmissionStore for ProfileJsonSubmissionStore {
    fn name(&self) -> &'static str {
        "profiles.submissions column"
    }

    async fn submit(&self, student_id: &Uuid, request: &SubmissionRequest) -> Result<Submission, AppError> {
        let submission = Submission {
            id: Uuid::new_v4(),
            student_id: *student_id,
            assignment_id: request.assignment_id,
            content: request.content.clone(),
            attachment_url: request.attachment_url.clone(),
            submitted_at: Utc::now(),
        };

        let updated = sqlx::query("UPDATE profiles SET submissions = submissions || $2::jsonb, updated_at = now() WHERE id = $1")
            .bind(student_id)
            .bind(Json(vec![submission.clone()]))
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Profile not found".to_string()));
        }

        Ok(submission)
    }

    async fn list_for_student(&self, student_id: &Uuid) -> Result<Vec<Submission>, AppError> {
        let stored = sqlx::query_scalar::<_, Json<Vec<Submission>>>("SELECT submissions FROM profiles WHERE id = $1")
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;

        let mut submissions = stored.map(|Json(list)| list).unwrap_or_default();
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(submissions)
    }
}

/// One-time capability probe: prefer the dedicated table when it exists.
pub async fn probe_submission_store(pool: &PgPool) -> Result<SharedSubmissionStore, AppError> {
    let has_table = sqlx::query_scalar::<_, bool>("SELECT to_regclass('public.assignment_submissions') IS NOT NULL")
        .fetch_one(pool)
        .await?;

    let store: SharedSubmissionStore = if has_table {
        Arc::new(TableSubmissionStore { pool: pool.clone() })
    } else {
        Arc::new(ProfileJsonSubmissionStore { pool: pool.clone() })
    };

    tracing::info!(store = store.name(), "submission store selected");
    Ok(store)
}
