use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::profile::{Profile, ProfileRow, ProfileUpdateRequest, Role};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait ProfileRepository {
    async fn get_profile_by_id(&self, id: &Uuid) -> Result<Option<Profile>, AppError>;
    async fn update_profile_contact(&self, id: &Uuid, request: &ProfileUpdateRequest) -> Result<Profile, AppError>;
    async fn set_profile_role(&self, id: &Uuid, role: Role) -> Result<Profile, AppError>;
    async fn set_profile_approval(&self, id: &Uuid, approved: bool) -> Result<Profile, AppError>;
}

pub(crate) fn into_profile(row: ProfileRow) -> Result<Profile, AppError> {
    Profile::try_from(row).map_err(|e| AppError::db("Invalid profile row", sqlx::Error::Decode(e.into())))
}

#[async_trait::async_trait]
impl ProfileRepository for PostgresRepository {
    async fn get_profile_by_id(&self, id: &Uuid) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, role, approved, full_name, email, phone, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_profile).transpose()
    }

    async fn update_profile_contact(&self, id: &Uuid, request: &ProfileUpdateRequest) -> Result<Profile, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles
            SET full_name = $1, phone = $2, updated_at = now()
            WHERE id = $3
            RETURNING id, role, approved, full_name, email, phone, updated_at
            "#,
        )
        .bind(&request.full_name)
        .bind(&request.phone)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        into_profile(row)
    }

    async fn set_profile_role(&self, id: &Uuid, role: Role) -> Result<Profile, AppError> {
        // Admins and students are always approved; a teacher starts pending.
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles
            SET role = $1,
                approved = CASE WHEN $1 = 'teacher' THEN false ELSE true END,
                updated_at = now()
            WHERE id = $2
            RETURNING id, role, approved, full_name, email, phone, updated_at
            "#,
        )
        .bind(role.as_db())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        into_profile(row)
    }

    async fn set_profile_approval(&self, id: &Uuid, approved: bool) -> Result<Profile, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles
            SET approved = $1, updated_at = now()
            WHERE id = $2 AND role = 'teacher'
            RETURNING id, role, approved, full_name, email, phone, updated_at
            "#,
        )
        .bind(approved)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => into_profile(row),
            None => Err(AppError::NotFound("Teacher profile not found".to_string())),
        }
    }
}
