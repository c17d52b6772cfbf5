use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::calendar_event::{CalendarEvent, CalendarEventRequest, CalendarEventRow, EventType};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait CalendarEventRepository {
    async fn create_calendar_event(&self, request: &CalendarEventRequest) -> Result<CalendarEvent, AppError>;
    async fn get_calendar_event_by_id(&self, id: &Uuid) -> Result<Option<CalendarEvent>, AppError>;
    async fn delete_calendar_event(&self, id: &Uuid) -> Result<bool, AppError>;
}

#[async_trait::async_trait]
impl CalendarEventRepository for PostgresRepository {
    /// Class events with an assigned teacher get a `scheduled` attendance row
    /// in the same transaction.
    async fn create_calendar_event(&self, request: &CalendarEventRequest) -> Result<CalendarEvent, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, CalendarEventRow>(
            r#"
            INSERT INTO calendar_events (title, event_type, teacher_id, course_id, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, event_type, teacher_id, course_id, start_time, end_time
            "#,
        )
        .bind(&request.title)
        .bind(request.event_type.as_db())
        .bind(request.teacher_id)
        .bind(request.course_id)
        .bind(request.start_time)
        .bind(request.end_time)
        .fetch_one(&mut *tx)
        .await?;

        let event = CalendarEvent::from(row);

        if let (EventType::Class, Some(teacher_id)) = (event.event_type, event.teacher_id) {
            sqlx::query(
                r#"
                INSERT INTO teacher_class_attendance (teacher_id, calendar_event_id, status)
                VALUES ($1, $2, 'scheduled')
                ON CONFLICT (teacher_id, calendar_event_id) DO NOTHING
                "#,
            )
            .bind(teacher_id)
            .bind(event.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(event)
    }

    async fn get_calendar_event_by_id(&self, id: &Uuid) -> Result<Option<CalendarEvent>, AppError> {
        let row = sqlx::query_as::<_, CalendarEventRow>(
            r#"
            SELECT id, title, event_type, teacher_id, course_id, start_time, end_time
            FROM calendar_events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CalendarEvent::from))
    }

    /// Attendance rows go with the event through `ON DELETE CASCADE`.
    async fn delete_calendar_event(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1").bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
