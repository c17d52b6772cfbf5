use crate::database::postgres_repository::PostgresRepository;
use crate::database::profile::into_profile;
use crate::error::app_error::AppError;
use crate::models::profile::{Profile, ProfileRow, Role};
use crate::models::user::{SignUpAttributes, User};
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::LazyLock;

/// A real Argon2 hash generated once, verified against when the email is
/// unknown so both branches of a login cost the same.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-never-matches", &salt)
        .ok()
        .map(|hash| hash.to_string())
});

impl PostgresRepository {
    /// Creates the credential row and its profile in one transaction.
    pub async fn create_user_with_profile(&self, email: &str, password: &str, attrs: &SignUpAttributes) -> Result<(User, Profile), AppError> {
        if self.get_user_by_email(email).await?.is_some() {
            return Err(AppError::UserAlreadyExists(email.to_string()));
        }

        let password_hash = hash_password(password)?;
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash
            "#,
        )
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await?;

        let profile_row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (id, role, approved, full_name, email, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, role, approved, full_name, email, phone, updated_at
            "#,
        )
        .bind(user.id)
        .bind(attrs.role.as_db())
        .bind(attrs.role != Role::Teacher)
        .bind(&attrs.full_name)
        .bind(email)
        .bind(&attrs.phone)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((user, into_profile(profile_row)?))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub fn verify_password(&self, user: &User, password: &str) -> Result<(), AppError> {
        let password_hash = PasswordHash::new(&user.password_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &password_hash)
            .map_err(|_| AppError::InvalidCredentials)
    }

    /// Throwaway verification for unknown accounts.
    pub fn dummy_verify(password: &str) {
        if let Some(hash) = DUMMY_HASH.as_deref().and_then(|hash| PasswordHash::new(hash).ok()) {
            let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
        }
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("a-long-enough-secret").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"a-long-enough-secret", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn dummy_verify_does_not_panic() {
        PostgresRepository::dummy_verify("anything");
    }
}
