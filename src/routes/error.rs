use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, catch};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Error {
    pub error: &'static str,
    pub message: String,
}

fn error(kind: &'static str, message: &str) -> Json<Error> {
    Json(Error {
        error: kind,
        message: message.to_string(),
    })
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<Error> {
    error("Unauthorized", "Authentication required")
}

#[catch(403)]
pub fn forbidden(_: &Request) -> Json<Error> {
    error("Forbidden", "Not allowed for this account")
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<Error> {
    error("NotFound", "Not found")
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<Error> {
    error("Conflict", "Conflict")
}

/// Malformed JSON bodies land here.
#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<Error> {
    error("BadRequest", "Request body could not be parsed")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<Error> {
    error("Internal", "Internal server error")
}
