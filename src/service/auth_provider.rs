use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::profile::Role;
use crate::models::session::{AuthSession, parse_session_token};
use crate::models::user::SignUpAttributes;
use chrono::{Duration, Utc};
use tracing::debug;

/// Contract of the authentication collaborator the session resolver sits on.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_session(&self) -> Result<Option<AuthSession>, AppError>;
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AppError>;
    async fn sign_up(&self, email: &str, password: &str, attrs: &SignUpAttributes) -> Result<AuthSession, AppError>;
    async fn refresh_session(&self, session: &AuthSession) -> Result<Option<AuthSession>, AppError>;
    async fn sign_out(&self, session: &AuthSession) -> Result<(), AppError>;
}

/// Password auth over `users`/`user_session`, bound to the token the client
/// presented on this request (if any).
pub struct PostgresAuthProvider {
    repo: PostgresRepository,
    token: Option<String>,
    session_ttl: Duration,
}

impl PostgresAuthProvider {
    pub fn new(repo: PostgresRepository, token: Option<String>, session_ttl: Duration) -> Self {
        Self { repo, token, session_ttl }
    }

    async fn issue_session(&self, user_id: &uuid::Uuid) -> Result<AuthSession, AppError> {
        let row = self.repo.create_session(user_id, Utc::now() + self.session_ttl).await?;
        Ok(AuthSession::from(row))
    }
}

#[async_trait::async_trait]
impl AuthProvider for PostgresAuthProvider {
    async fn get_session(&self) -> Result<Option<AuthSession>, AppError> {
        let Some((session_id, user_id)) = self.token.as_deref().and_then(parse_session_token) else {
            return Ok(None);
        };

        match self.repo.get_active_session(&session_id, &user_id).await? {
            Some(row) => Ok(Some(AuthSession::from(row))),
            None => {
                debug!(session_id = %session_id, "session missing or expired");
                self.repo.delete_session_if_expired(&session_id).await?;
                Ok(None)
            }
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let Some(user) = self.repo.get_user_by_email(email).await? else {
            PostgresRepository::dummy_verify(password);
            return Err(AppError::InvalidCredentials);
        };

        self.repo.verify_password(&user, password)?;
        self.issue_session(&user.id).await
    }

    async fn sign_up(&self, email: &str, password: &str, attrs: &SignUpAttributes) -> Result<AuthSession, AppError> {
        if attrs.role == Role::Admin {
            return Err(AppError::BadRequest("Admin accounts are assigned by an administrator".to_string()));
        }

        let (user, _profile) = self.repo.create_user_with_profile(email, password, attrs).await?;
        self.issue_session(&user.id).await
    }

    async fn refresh_session(&self, session: &AuthSession) -> Result<Option<AuthSession>, AppError> {
        let Some(session_id) = session.session_id() else {
            return Ok(None);
        };
        let row = self.repo.extend_session(&session_id, Utc::now() + self.session_ttl).await?;
        Ok(row.map(AuthSession::from))
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AppError> {
        if let Some(session_id) = session.session_id() {
            self.repo.delete_session(&session_id).await?;
        }
        Ok(())
    }
}
