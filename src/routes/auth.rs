use crate::auth::{ApiKey, SessionContext, SessionToken, build_resolver, clear_session_cookie, set_session_cookie};
use crate::config::Config;
use crate::error::app_error::AppError;
use crate::models::session::{AuthEvent, AuthStateResponse, SessionResponse};
use crate::models::user::{LoginRequest, SignUpAttributes, SignUpRequest};
use crate::service::profile_cache::ProfileCache;
use crate::service::routing::{LOGIN_PATH, SIGNUP_PATH, canonical_path_for};
use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use std::sync::Arc;
use validator::Validate;

/// Create an account and its profile, then sign in
#[openapi(tag = "Auth")]
#[post("/signup?<current_path>", data = "<payload>")]
pub async fn sign_up(
    pool: &State<PgPool>,
    config: &State<Config>,
    cache: &State<Arc<ProfileCache>>,
    cookies: &CookieJar<'_>,
    _api_key: ApiKey,
    current_path: Option<String>,
    payload: Json<SignUpRequest>,
) -> Result<(Status, Json<AuthStateResponse>), AppError> {
    payload.validate()?;

    let mut resolver = build_resolver(pool, config, cache, None);
    let session = resolver.sign_up(&payload.email, &payload.password, &SignUpAttributes::from(&*payload)).await?;
    set_session_cookie(cookies, &session, config.session.ttl());

    let redirect = resolver
        .on_auth_state_change(AuthEvent::SignedIn, Some(session), current_path.as_deref().unwrap_or(SIGNUP_PATH))
        .await;
    Ok((Status::Created, Json(AuthStateResponse::new(resolver.view(), redirect))))
}

/// Sign in with email and password
#[openapi(tag = "Auth")]
#[post("/login?<current_path>", data = "<payload>")]
pub async fn login(
    pool: &State<PgPool>,
    config: &State<Config>,
    cache: &State<Arc<ProfileCache>>,
    cookies: &CookieJar<'_>,
    _api_key: ApiKey,
    current_path: Option<String>,
    payload: Json<LoginRequest>,
) -> Result<Json<AuthStateResponse>, AppError> {
    payload.validate()?;

    let mut resolver = build_resolver(pool, config, cache, None);
    let session = resolver.sign_in(&payload.email, &payload.password).await?;
    set_session_cookie(cookies, &session, config.session.ttl());

    let redirect = resolver
        .on_auth_state_change(AuthEvent::SignedIn, Some(session), current_path.as_deref().unwrap_or(LOGIN_PATH))
        .await;
    Ok(Json(AuthStateResponse::new(resolver.view(), redirect)))
}

/// Extend the current session
#[openapi(tag = "Auth")]
#[post("/refresh?<current_path>")]
pub async fn refresh(
    pool: &State<PgPool>,
    config: &State<Config>,
    cache: &State<Arc<ProfileCache>>,
    cookies: &CookieJar<'_>,
    _api_key: ApiKey,
    token: SessionToken,
    current_path: Option<String>,
) -> Result<Json<AuthStateResponse>, AppError> {
    let mut resolver = build_resolver(pool, config, cache, token.0);
    resolver.initialize().await;

    let Some(session) = resolver.refresh_session().await? else {
        clear_session_cookie(cookies);
        return Err(AppError::Unauthorized);
    };
    set_session_cookie(cookies, &session, config.session.ttl());

    let redirect = resolver
        .on_auth_state_change(AuthEvent::TokenRefreshed, Some(session), current_path.as_deref().unwrap_or_default())
        .await;
    Ok(Json(AuthStateResponse::new(resolver.view(), redirect)))
}

/// Sign out and drop every cached profile
#[openapi(tag = "Auth")]
#[post("/logout?<current_path>")]
pub async fn logout(
    pool: &State<PgPool>,
    config: &State<Config>,
    cache: &State<Arc<ProfileCache>>,
    cookies: &CookieJar<'_>,
    _api_key: ApiKey,
    token: SessionToken,
    current_path: Option<String>,
) -> Result<Json<AuthStateResponse>, AppError> {
    let mut resolver = build_resolver(pool, config, cache, token.0);
    resolver.initialize().await;
    resolver.sign_out().await?;
    clear_session_cookie(cookies);

    let redirect = resolver
        .on_auth_state_change(AuthEvent::SignedOut, None, current_path.as_deref().unwrap_or_default())
        .await;
    Ok(Json(AuthStateResponse::new(resolver.view(), redirect)))
}

/// Current session, user and profile
#[openapi(tag = "Auth")]
#[get("/session")]
pub async fn get_session(_api_key: ApiKey, context: SessionContext) -> Json<SessionResponse> {
    Json(SessionResponse::new(&context.view, canonical_path_for(&context.view)))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![sign_up, login, refresh, logout, get_session]
}
