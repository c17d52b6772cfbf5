use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::session::SessionRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

impl PostgresRepository {
    pub async fn create_session(&self, user_id: &Uuid, expires_at: DateTime<Utc>) -> Result<SessionRow, AppError> {
        self.delete_expired_sessions_for_user(user_id).await?;

        let session = sqlx::query_as::<_, SessionRow>(
            r#"
            WITH inserted AS (
                INSERT INTO user_session (user_id, expires_at)
                VALUES ($1, $2)
                RETURNING id, user_id, expires_at
            )
            SELECT i.id, i.user_id, u.email, i.expires_at
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    pub async fn get_active_session(&self, session_id: &Uuid, user_id: &Uuid) -> Result<Option<SessionRow>, AppError> {
        let session = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT s.id, s.user_id, u.email, s.expires_at
            FROM user_session s
            JOIN users u ON u.id = s.user_id
            WHERE s.id = $1
              AND s.user_id = $2
              AND s.expires_at > now()
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Pushes the expiry of a live session forward. Expired sessions stay expired.
    pub async fn extend_session(&self, session_id: &Uuid, expires_at: DateTime<Utc>) -> Result<Option<SessionRow>, AppError> {
        let session = sqlx::query_as::<_, SessionRow>(
            r#"
            WITH updated AS (
                UPDATE user_session
                SET expires_at = $2
                WHERE id = $1 AND expires_at > now()
                RETURNING id, user_id, expires_at
            )
            SELECT up.id, up.user_id, u.email, up.expires_at
            FROM updated up
            JOIN users u ON u.id = up.user_id
            "#,
        )
        .bind(session_id)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    pub async fn delete_session_if_expired(&self, session_id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_session WHERE id = $1 AND expires_at <= now()")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_expired_sessions_for_user(&self, user_id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_session WHERE user_id = $1 AND expires_at <= now()")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_session(&self, session_id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_session WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
