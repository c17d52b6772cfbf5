use crate::auth::{Actor, ApiKey};
use crate::database::calendar_event::CalendarEventRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::calendar_event::{CalendarEventRequest, CalendarEventResponse};
use crate::models::profile::Role;
use rocket::serde::json::Json;
use rocket::{State, delete, get, http::Status, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Schedule an event. Teachers may only schedule their own classes.
#[openapi(tag = "Calendar Events")]
#[post("/", data = "<payload>")]
pub async fn create_calendar_event(
    pool: &State<PgPool>,
    _api_key: ApiKey,
    actor: Actor,
    payload: Json<CalendarEventRequest>,
) -> Result<(Status, Json<CalendarEventResponse>), AppError> {
    payload.validate()?;

    if !actor.is_admin() {
        let teacher = actor.require_role(Role::Teacher)?;
        if payload.teacher_id != Some(teacher.id) {
            return Err(AppError::Forbidden);
        }
    }

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let event = repo.create_calendar_event(&payload).await?;
    Ok((Status::Created, Json(CalendarEventResponse::from(&event))))
}

#[openapi(tag = "Calendar Events")]
#[get("/<id>")]
pub async fn get_calendar_event(pool: &State<PgPool>, _api_key: ApiKey, _actor: Actor, id: String) -> Result<Json<CalendarEventResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(&id)?;
    match repo.get_calendar_event_by_id(&uuid).await? {
        Some(event) => Ok(Json(CalendarEventResponse::from(&event))),
        None => Err(AppError::EventNotFound(id)),
    }
}

/// Remove an event and its attendance rows (admin only)
#[openapi(tag = "Calendar Events")]
#[delete("/<id>")]
pub async fn delete_calendar_event(pool: &State<PgPool>, _api_key: ApiKey, actor: Actor, id: String) -> Result<Status, AppError> {
    actor.require_admin()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(&id)?;
    if repo.delete_calendar_event(&uuid).await? {
        Ok(Status::NoContent)
    } else {
        Err(AppError::EventNotFound(id))
    }
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_calendar_event, get_calendar_event, delete_calendar_event]
}
