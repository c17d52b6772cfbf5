use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    Scheduled,
    Completed,
    Approved,
    Rejected,
}

impl AttendanceStatus {
    pub fn as_db(&self) -> &'static str {
        match self {
            AttendanceStatus::Scheduled => "scheduled",
            AttendanceStatus::Completed => "completed",
            AttendanceStatus::Approved => "approved",
            AttendanceStatus::Rejected => "rejected",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(AttendanceStatus::Scheduled),
            "completed" => Some(AttendanceStatus::Completed),
            "approved" => Some(AttendanceStatus::Approved),
            "rejected" => Some(AttendanceStatus::Rejected),
            _ => None,
        }
    }

    /// Completed, or already reviewed by an admin.
    pub fn is_completed_or_beyond(&self) -> bool {
        *self >= AttendanceStatus::Completed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub calendar_event_id: Uuid,
    pub status: AttendanceStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub base_amount: i64,
    pub bonus_amount: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub calendar_event_id: Uuid,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub base_amount: i64,
    pub bonus_amount: i64,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = String;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::from_db(&row.status).ok_or_else(|| format!("unknown attendance status '{}' on {}", row.status, row.id))?;
        Ok(Self {
            id: row.id,
            teacher_id: row.teacher_id,
            calendar_event_id: row.calendar_event_id,
            status,
            completed_at: row.completed_at,
            base_amount: row.base_amount,
            bonus_amount: row.bonus_amount,
        })
    }
}

#[derive(Deserialize, Debug, JsonSchema)]
pub struct MarkCompleteRequest {
    pub teacher_id: Uuid,
    pub event_id: Uuid,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct AttendanceResponse {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub calendar_event_id: Uuid,
    pub status: AttendanceStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub base_amount: i64,
    pub bonus_amount: i64,
}

impl From<&AttendanceRecord> for AttendanceResponse {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            id: record.id,
            teacher_id: record.teacher_id,
            calendar_event_id: record.calendar_event_id,
            status: record.status,
            completed_at: record.completed_at,
            base_amount: record.base_amount,
            bonus_amount: record.bonus_amount,
        }
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct MarkCompleteResponse {
    pub attendance: AttendanceResponse,
}
