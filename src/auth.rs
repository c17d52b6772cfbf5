use crate::config::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::profile::{Profile, Role};
use crate::models::session::{AuthSession, SessionView};
use crate::service::auth_provider::PostgresAuthProvider;
use crate::service::profile_cache::ProfileCache;
use crate::service::session_resolver::SessionResolver;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, RefOr, Response, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";
pub const API_KEY_HEADER: &str = "apikey";
pub const SERVICE_ROLE_HEADER: &str = "X-Service-Role-Key";

pub type AppSessionResolver = SessionResolver<PostgresAuthProvider, PostgresRepository>;

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

/// Session token from the private cookie, falling back to a bearer header.
pub fn session_token(req: &Request<'_>) -> Option<String> {
    if let Some(cookie) = req.cookies().get_private(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get_one("Authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

pub fn build_resolver(pool: &PgPool, config: &Config, cache: &Arc<ProfileCache>, token: Option<String>) -> AppSessionResolver {
    let repo = PostgresRepository { pool: pool.clone() };
    let provider = PostgresAuthProvider::new(repo.clone(), token, config.session.ttl());
    SessionResolver::new(provider, repo, cache.clone())
}

pub fn set_session_cookie(cookies: &CookieJar<'_>, session: &AuthSession, ttl: chrono::Duration) {
    let cookie = Cookie::build((SESSION_COOKIE, session.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(rocket::time::Duration::seconds(ttl.num_seconds()))
        .build();
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::build(SESSION_COOKIE).path("/").build());
}

fn has_service_role(req: &Request<'_>, config: &Config) -> bool {
    let expected = config.store.service_role_key.as_str();
    !expected.is_empty() && req.headers().get_one(SERVICE_ROLE_HEADER) == Some(expected)
}

/// Raw session token presented with the request, if any.
pub struct SessionToken(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionToken {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        Outcome::Success(SessionToken(session_token(req)))
    }
}

/// Resolved session view for this request. Resolution happens once per
/// request and never fails; an unusable session is simply an empty view.
pub struct SessionContext {
    pub view: SessionView,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionContext {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let rocket = req.rocket();
        let (Some(pool), Some(config), Some(cache)) = (rocket.state::<PgPool>(), rocket.state::<Config>(), rocket.state::<Arc<ProfileCache>>()) else {
            tracing::error!("session resolution needs the pool, config and profile cache in managed state");
            return Outcome::Error((Status::Unauthorized, AppError::Unauthorized));
        };

        let view = req
            .local_cache_async(async {
                let mut resolver = build_resolver(pool, config, cache, session_token(req));
                resolver.initialize().await;
                resolver.into_view()
            })
            .await;

        if let Some(user) = &view.user {
            req.local_cache(|| {
                Some(CurrentUser {
                    id: user.id,
                    email: user.email.clone(),
                })
            });
        }

        Outcome::Success(SessionContext { view: view.clone() })
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let context = match req.guard::<SessionContext>().await {
            Outcome::Success(context) => context,
            Outcome::Error(error) => return Outcome::Error(error),
            Outcome::Forward(status) => return Outcome::Forward(status),
        };

        match context.view.user {
            Some(user) => Outcome::Success(CurrentUser { id: user.id, email: user.email }),
            None => Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
        }
    }
}

/// Who is acting: a signed-in member with a resolved profile, or a trusted
/// caller holding the service-role key.
#[derive(Debug, Clone)]
pub enum Actor {
    ServiceRole,
    Member(Profile),
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        match self {
            Actor::ServiceRole => true,
            Actor::Member(profile) => profile.role == Role::Admin,
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() { Ok(()) } else { Err(AppError::Forbidden) }
    }

    /// Member profile with `role`; teachers must also be approved.
    pub fn require_role(&self, role: Role) -> Result<&Profile, AppError> {
        match self {
            Actor::Member(profile) if profile.role == role && profile.is_effectively_approved() => Ok(profile),
            _ => Err(AppError::Forbidden),
        }
    }

    pub fn profile(&self) -> Result<&Profile, AppError> {
        match self {
            Actor::Member(profile) => Ok(profile),
            Actor::ServiceRole => Err(AppError::BadRequest("The service role has no profile".to_string())),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Actor {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        if let Some(config) = req.rocket().state::<Config>()
            && has_service_role(req, config)
        {
            return Outcome::Success(Actor::ServiceRole);
        }

        let context = match req.guard::<SessionContext>().await {
            Outcome::Success(context) => context,
            Outcome::Error(error) => return Outcome::Error(error),
            Outcome::Forward(status) => return Outcome::Forward(status),
        };

        // No user or no profile both fail closed.
        match (context.view.user, context.view.profile) {
            (Some(_), Some(profile)) => Outcome::Success(Actor::Member(profile)),
            _ => Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
        }
    }
}

/// Requires the store's anonymous (or service-role) key when one is configured.
pub struct ApiKey;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiKey {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<Config>() else {
            return Outcome::Success(ApiKey);
        };

        let anon_key = config.store.anon_key.as_str();
        if anon_key.is_empty() {
            return Outcome::Success(ApiKey);
        }

        let presented = req.headers().get_one(API_KEY_HEADER);
        let service_key = config.store.service_role_key.as_str();
        if presented == Some(anon_key) || (!service_key.is_empty() && presented == Some(service_key)) {
            Outcome::Success(ApiKey)
        } else {
            tracing::warn!(method = %req.method(), uri = %req.uri(), "missing or invalid api key");
            Outcome::Error((Status::Unauthorized, AppError::Unauthorized))
        }
    }
}

fn unauthorized_responses() -> rocket_okapi::Result<Responses> {
    let mut responses = Responses::default();
    responses.responses.insert(
        "401".to_string(),
        RefOr::Object(Response {
            description: "Unauthorized - Authentication required".to_string(),
            ..Default::default()
        }),
    );
    Ok(responses)
}

fn cookie_security() -> RequestHeaderInput {
    let security_scheme = SecurityScheme {
        description: Some("Cookie-based authentication. Log in via POST /api/auth/login to obtain the session cookie.".to_string()),
        data: SecuritySchemeData::ApiKey {
            name: SESSION_COOKIE.to_string(),
            location: "cookie".to_string(),
        },
        extensions: Object::default(),
    };

    let mut security_req = SecurityRequirement::new();
    security_req.insert("cookieAuth".to_string(), Vec::new());

    RequestHeaderInput::Security("cookieAuth".to_string(), security_scheme, security_req)
}

impl<'a> OpenApiFromRequest<'a> for SessionToken {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}

impl<'a> OpenApiFromRequest<'a> for SessionContext {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(cookie_security())
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        unauthorized_responses()
    }
}

impl<'a> OpenApiFromRequest<'a> for Actor {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(cookie_security())
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        unauthorized_responses()
    }
}

impl<'a> OpenApiFromRequest<'a> for ApiKey {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Store anonymous key.".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: API_KEY_HEADER.to_string(),
                location: "header".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("apiKey".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("apiKey".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        unauthorized_responses()
    }
}
