use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::attendance::{AttendanceRecord, AttendanceRow};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait AttendanceRepository {
    async fn get_attendance(&self, teacher_id: &Uuid, calendar_event_id: &Uuid) -> Result<Option<AttendanceRecord>, AppError>;

    /// Atomically inserts a `completed` record for the pair, or moves an
    /// existing `scheduled` record to `completed`. Returns `None` when a record
    /// already sits at `completed` or beyond, in which case nothing was written.
    async fn complete_attendance(
        &self,
        teacher_id: &Uuid,
        calendar_event_id: &Uuid,
        completed_at: DateTime<Utc>,
        base_amount: i64,
    ) -> Result<Option<AttendanceRecord>, AppError>;
}

fn into_record(row: AttendanceRow) -> Result<AttendanceRecord, AppError> {
    AttendanceRecord::try_from(row).map_err(|e| AppError::db("Invalid attendance row", sqlx::Error::Decode(e.into())))
}

#[async_trait::async_trait]
impl AttendanceRepository for PostgresRepository {
    async fn get_attendance(&self, teacher_id: &Uuid, calendar_event_id: &Uuid) -> Result<Option<AttendanceRecord>, AppError> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, teacher_id, calendar_event_id, status, completed_at, base_amount, bonus_amount
            FROM teacher_class_attendance
            WHERE teacher_id = $1 AND calendar_event_id = $2
            "#,
        )
        .bind(teacher_id)
        .bind(calendar_event_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_record).transpose()
    }

    async fn complete_attendance(
        &self,
        teacher_id: &Uuid,
        calendar_event_id: &Uuid,
        completed_at: DateTime<Utc>,
        base_amount: i64,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            INSERT INTO teacher_class_attendance (teacher_id, calendar_event_id, status, completed_at, base_amount, bonus_amount)
            VALUES ($1, $2, 'completed', $3, $4, 0)
            ON CONFLICT (teacher_id, calendar_event_id) DO UPDATE
                SET status = 'completed',
                    completed_at = EXCLUDED.completed_at,
                    updated_at = now()
                WHERE teacher_class_attendance.status = 'scheduled'
            RETURNING id, teacher_id, calendar_event_id, status, completed_at, base_amount, bonus_amount
            "#,
        )
        .bind(teacher_id)
        .bind(calendar_event_id)
        .bind(completed_at)
        .bind(base_amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::write_failed("Failed to complete attendance", e))?;

        row.map(into_record).transpose()
    }
}
