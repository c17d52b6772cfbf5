use crate::models::profile::{Profile, ProfileResponse};
use chrono::{DateTime, Utc};
use rocket::serde::Serialize;
use schemars::JsonSchema;
use uuid::Uuid;

/// Session row joined with the owning user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Credential handed out by the auth provider. `access_token` is the opaque
/// cookie value `<session_id>:<user_id>`.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct AuthSession {
    pub user: AuthUser,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub access_token: String,
}

impl AuthSession {
    pub fn session_id(&self) -> Option<Uuid> {
        parse_session_token(&self.access_token).map(|(session_id, _)| session_id)
    }
}

impl From<SessionRow> for AuthSession {
    fn from(row: SessionRow) -> Self {
        Self {
            access_token: session_token(&row.id, &row.user_id),
            user: AuthUser {
                id: row.user_id,
                email: row.email,
            },
            expires_at: row.expires_at,
        }
    }
}

pub fn session_token(session_id: &Uuid, user_id: &Uuid) -> String {
    format!("{}:{}", session_id, user_id)
}

pub fn parse_session_token(value: &str) -> Option<(Uuid, Uuid)> {
    let (session_id_str, user_id_str) = value.split_once(':')?;
    let session_id = Uuid::parse_str(session_id_str).ok()?;
    let user_id = Uuid::parse_str(user_id_str).ok()?;
    Some((session_id, user_id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// What every route guard reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub session: Option<AuthSession>,
    pub user: Option<AuthUser>,
    pub profile: Option<Profile>,
    pub is_loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Navigation {
    pub path: String,
    /// Full page load instead of client-side routing.
    pub hard: bool,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct SessionResponse {
    pub session: Option<AuthSession>,
    pub user: Option<AuthUser>,
    pub profile: Option<ProfileResponse>,
    pub is_loading: bool,
    pub canonical_path: String,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct AuthStateResponse {
    pub session: Option<AuthSession>,
    pub profile: Option<ProfileResponse>,
    pub redirect: Option<Navigation>,
}

impl SessionResponse {
    pub fn new(view: &SessionView, canonical_path: &str) -> Self {
        Self {
            session: view.session.clone(),
            user: view.user.clone(),
            profile: view.profile.as_ref().map(ProfileResponse::from),
            is_loading: view.is_loading,
            canonical_path: canonical_path.to_string(),
        }
    }
}

impl AuthStateResponse {
    pub fn new(view: &SessionView, redirect: Option<Navigation>) -> Self {
        Self {
            session: view.session.clone(),
            profile: view.profile.as_ref().map(ProfileResponse::from),
            redirect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_session_token_valid() {
        let session_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let parsed = parse_session_token(&session_token(&session_id, &user_id));
        assert_eq!(parsed, Some((session_id, user_id)));
    }

    #[test]
    fn parse_session_token_invalid_uuid() {
        assert!(parse_session_token("not-a-uuid:user@example.com").is_none());
    }

    #[test]
    fn parse_session_token_missing_delimiter() {
        assert!(parse_session_token("missing-delimiter").is_none());
    }

    #[test]
    fn access_token_is_not_serialized() {
        let session = AuthSession {
            user: AuthUser {
                id: Uuid::new_v4(),
                email: "t@example.com".to_string(),
            },
            expires_at: Utc::now(),
            access_token: "secret-token".to_string(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret-token"));
    }
}
