use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Class,
    Holiday,
    Exam,
    Assignment,
    Payment,
    Other,
}

impl EventType {
    pub fn as_db(&self) -> &'static str {
        match self {
            EventType::Class => "class",
            EventType::Holiday => "holiday",
            EventType::Exam => "exam",
            EventType::Assignment => "assignment",
            EventType::Payment => "payment",
            EventType::Other => "other",
        }
    }

    /// Unrecognised values are kept as `Other` so listings never fail.
    pub fn from_db(value: &str) -> Self {
        match value {
            "class" => EventType::Class,
            "holiday" => EventType::Holiday,
            "exam" => EventType::Exam,
            "assignment" => EventType::Assignment,
            "payment" => EventType::Payment,
            _ => EventType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub event_type: EventType,
    pub teacher_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl CalendarEvent {
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now
    }
}

impl Default for CalendarEvent {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: String::new(),
            event_type: EventType::Class,
            teacher_id: None,
            course_id: None,
            start_time: DateTime::<Utc>::UNIX_EPOCH,
            end_time: None,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct CalendarEventRow {
    pub id: Uuid,
    pub title: String,
    pub event_type: String,
    pub teacher_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl From<CalendarEventRow> for CalendarEvent {
    fn from(row: CalendarEventRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            event_type: EventType::from_db(&row.event_type),
            teacher_id: row.teacher_id,
            course_id: row.course_id,
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
#[validate(schema(function = "validate_event_window"))]
pub struct CalendarEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub event_type: EventType,
    pub teacher_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

fn validate_event_window(request: &CalendarEventRequest) -> Result<(), ValidationError> {
    match request.end_time {
        Some(end_time) if end_time < request.start_time => {
            let mut error = ValidationError::new("event_window");
            error.message = Some("end_time must not be before start_time".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct CalendarEventResponse {
    pub id: Uuid,
    pub title: String,
    pub event_type: EventType,
    pub teacher_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl From<&CalendarEvent> for CalendarEventResponse {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            event_type: event.event_type,
            teacher_id: event.teacher_id,
            course_id: event.course_id,
            start_time: event.start_time,
            end_time: event.end_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn end_before_start_is_invalid() {
        let start = Utc::now();
        let request = CalendarEventRequest {
            title: "Algebra".to_string(),
            event_type: EventType::Class,
            teacher_id: None,
            course_id: None,
            start_time: start,
            end_time: Some(start - Duration::minutes(5)),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn open_ended_event_is_valid() {
        let request = CalendarEventRequest {
            title: "Office hours".to_string(),
            event_type: EventType::Other,
            teacher_id: None,
            course_id: None,
            start_time: Utc::now(),
            end_time: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn unknown_event_type_falls_back_to_other() {
        assert_eq!(EventType::from_db("webinar"), EventType::Other);
        assert_eq!(EventType::from_db(EventType::Exam.as_db()), EventType::Exam);
    }
}
