use crate::auth::{Actor, ApiKey};
use crate::database::submission::SharedSubmissionStore;
use crate::error::app_error::AppError;
use crate::models::profile::Role;
use crate::models::submission::{SubmissionRequest, SubmissionResponse};
use rocket::serde::json::Json;
use rocket::{State, get, http::Status, post};
use rocket_okapi::openapi;
use validator::Validate;

/// Hand in an assignment
#[openapi(tag = "Submissions")]
#[post("/", data = "<payload>")]
pub async fn create_submission(
    store: &State<SharedSubmissionStore>,
    _api_key: ApiKey,
    actor: Actor,
    payload: Json<SubmissionRequest>,
) -> Result<(Status, Json<SubmissionResponse>), AppError> {
    payload.validate()?;
    let student = actor.require_role(Role::Student)?;

    let submission = store.submit(&student.id, &payload).await?;
    Ok((Status::Created, Json(SubmissionResponse::from(&submission))))
}

/// The caller's own submissions, newest first
#[openapi(tag = "Submissions")]
#[get("/")]
pub async fn list_my_submissions(store: &State<SharedSubmissionStore>, _api_key: ApiKey, actor: Actor) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    let student = actor.require_role(Role::Student)?;

    let submissions = store.list_for_student(&student.id).await?;
    Ok(Json(submissions.iter().map(SubmissionResponse::from).collect()))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_submission, list_my_submissions]
}
