use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub student_id: Uuid,
    pub assignment_id: Uuid,
    pub content: String,
    pub attachment_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct SubmissionRequest {
    pub assignment_id: Uuid,
    #[validate(length(min = 1, max = 20000))]
    pub content: String,
    #[validate(url)]
    pub attachment_url: Option<String>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub content: String,
    pub attachment_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<&Submission> for SubmissionResponse {
    fn from(submission: &Submission) -> Self {
        Self {
            id: submission.id,
            assignment_id: submission.assignment_id,
            content: submission.content.clone(),
            attachment_url: submission.attachment_url.clone(),
            submitted_at: submission.submitted_at,
        }
    }
}
