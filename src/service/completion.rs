use crate::database::attendance::AttendanceRepository;
use crate::database::calendar_event::CalendarEventRepository;
use crate::error::app_error::AppError;
use crate::models::attendance::AttendanceRecord;
use crate::models::calendar_event::EventType;
use crate::service::clock::Clock;
use tracing::{debug, info};
use uuid::Uuid;

const WRITE_FAILED: &str = "Failed to complete attendance";

/// Marks class events as taught and keeps exactly one attendance record per
/// (teacher, event). Safe to retry: a second call returns the first result.
pub struct CompletionService<'a, R> {
    repository: &'a R,
    clock: &'a dyn Clock,
    default_base_amount: i64,
}

impl<'a, R> CompletionService<'a, R>
where
    R: CalendarEventRepository + AttendanceRepository + Sync,
{
    pub fn new(repository: &'a R, clock: &'a dyn Clock, default_base_amount: i64) -> Self {
        CompletionService {
            repository,
            clock,
            default_base_amount,
        }
    }

    pub async fn mark_complete(&self, teacher_id: &Uuid, event_id: &Uuid) -> Result<AttendanceRecord, AppError> {
        let event = self
            .repository
            .get_calendar_event_by_id(event_id)
            .await
            .map_err(|e| e.into_write_failed(WRITE_FAILED))?
            .ok_or_else(|| AppError::EventNotFound(event_id.to_string()))?;

        let now = self.clock.now();
        // An event without an end time counts as in progress once it has started.
        if !event.has_started(now) {
            return Err(AppError::InvalidState("Future events cannot be marked complete".to_string()));
        }

        if event.event_type != EventType::Class {
            return Err(AppError::InvalidState(format!(
                "Only class events can be marked complete, this is a {} event",
                event.event_type.as_db()
            )));
        }

        if event.teacher_id.is_some_and(|assigned| assigned != *teacher_id) {
            return Err(AppError::InvalidState("Event is assigned to a different teacher".to_string()));
        }

        let existing = self
            .repository
            .get_attendance(teacher_id, event_id)
            .await
            .map_err(|e| e.into_write_failed(WRITE_FAILED))?;

        if let Some(record) = existing.filter(|record| record.status.is_completed_or_beyond()) {
            debug!(attendance_id = %record.id, status = ?record.status, "attendance already completed");
            return Ok(record);
        }

        let written = self
            .repository
            .complete_attendance(teacher_id, event_id, now, self.default_base_amount)
            .await
            .map_err(|e| e.into_write_failed(WRITE_FAILED))?;

        if let Some(record) = written {
            info!(
                attendance_id = %record.id,
                teacher_id = %teacher_id,
                event_id = %event_id,
                "class marked complete"
            );
            return Ok(record);
        }

        // A concurrent call completed it between our read and write.
        self.repository
            .get_attendance(teacher_id, event_id)
            .await
            .map_err(|e| e.into_write_failed(WRITE_FAILED))?
            .ok_or_else(|| AppError::write_failed(WRITE_FAILED, sqlx::Error::RowNotFound))
    }
}
