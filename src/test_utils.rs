use crate::config::ProfileCacheConfig;
use crate::database::attendance::AttendanceRepository;
use crate::database::calendar_event::CalendarEventRepository;
use crate::database::profile::ProfileRepository;
use crate::error::app_error::AppError;
use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::calendar_event::{CalendarEvent, CalendarEventRequest, EventType};
use crate::models::profile::{Profile, ProfileUpdateRequest, Role};
use crate::models::session::{AuthSession, AuthUser, session_token};
use crate::models::user::SignUpAttributes;
use crate::service::auth_provider::AuthProvider;
use crate::service::clock::Clock;
use crate::service::profile_cache::ProfileCache;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const MOCK_PASSWORD: &str = "correct-horse-battery-staple";

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn test_cache(ttl_seconds: u64) -> (Arc<ProfileCache>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let cache = ProfileCache::new(
        &ProfileCacheConfig {
            ttl_seconds,
            cleanup_interval_seconds: 60,
        },
        clock.clone(),
    );
    (Arc::new(cache), clock)
}

pub fn sample_profile(role: Role, approved: bool) -> Profile {
    let id = Uuid::new_v4();
    Profile {
        id,
        role,
        approved,
        full_name: "Test User".to_string(),
        email: format!("{}@example.com", id.simple()),
        phone: None,
        updated_at: Utc::now(),
    }
}

pub fn sample_session(profile: &Profile) -> AuthSession {
    AuthSession {
        user: AuthUser {
            id: profile.id,
            email: profile.email.clone(),
        },
        expires_at: Utc::now() + Duration::days(7),
        access_token: session_token(&Uuid::new_v4(), &profile.id),
    }
}

pub fn class_event(teacher_id: Uuid, start_time: DateTime<Utc>, end_time: Option<DateTime<Utc>>) -> CalendarEvent {
    CalendarEvent {
        id: Uuid::new_v4(),
        title: "Grade 7 Mathematics".to_string(),
        event_type: EventType::Class,
        teacher_id: Some(teacher_id),
        course_id: Some(Uuid::new_v4()),
        start_time,
        end_time,
    }
}

/// In-memory store. The attendance upsert runs under one lock, like the
/// conditional insert does in Postgres.
#[derive(Default)]
pub struct MockRepository {
    profiles: Mutex<HashMap<Uuid, Profile>>,
    events: Mutex<HashMap<Uuid, CalendarEvent>>,
    attendance: Mutex<Vec<AttendanceRecord>>,
    profile_fetches: AtomicUsize,
    fail_profiles: AtomicBool,
    fail_writes: AtomicBool,
}

impl MockRepository {
    pub fn with_profile(self, profile: Profile) -> Self {
        self.profiles.lock().unwrap().insert(profile.id, profile);
        self
    }

    pub fn with_event(self, event: CalendarEvent) -> Self {
        self.events.lock().unwrap().insert(event.id, event);
        self
    }

    pub fn profile_fetches(&self) -> usize {
        self.profile_fetches.load(Ordering::SeqCst)
    }

    pub fn fail_profile_fetches(&self, fail: bool) {
        self.fail_profiles.store(fail, Ordering::SeqCst);
    }

    pub fn fail_attendance_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_approval(&self, id: &Uuid, approved: bool) {
        if let Some(profile) = self.profiles.lock().unwrap().get_mut(id) {
            profile.approved = approved;
        }
    }

    pub fn attendance_count(&self) -> usize {
        self.attendance.lock().unwrap().len()
    }

    pub fn insert_scheduled_attendance(&self, teacher_id: Uuid, calendar_event_id: Uuid, base_amount: i64) -> AttendanceRecord {
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            teacher_id,
            calendar_event_id,
            status: AttendanceStatus::Scheduled,
            completed_at: None,
            base_amount,
            bonus_amount: 0,
        };
        self.attendance.lock().unwrap().push(record.clone());
        record
    }

    pub fn insert_attendance_with_status(&self, teacher_id: Uuid, calendar_event_id: Uuid, status: AttendanceStatus) -> AttendanceRecord {
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            teacher_id,
            calendar_event_id,
            status,
            completed_at: Some(Utc::now() - Duration::days(1)),
            base_amount: 2000,
            bonus_amount: 500,
        };
        self.attendance.lock().unwrap().push(record.clone());
        record
    }

    fn update_profile(&self, id: &Uuid, apply: impl FnOnce(&mut Profile)) -> Result<Profile, AppError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles.get_mut(id).ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        apply(profile);
        Ok(profile.clone())
    }
}

#[async_trait::async_trait]
impl ProfileRepository for MockRepository {
    async fn get_profile_by_id(&self, id: &Uuid) -> Result<Option<Profile>, AppError> {
        self.profile_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_profiles.load(Ordering::SeqCst) {
            return Err(AppError::db("Database error", sqlx::Error::PoolTimedOut));
        }
        Ok(self.profiles.lock().unwrap().get(id).cloned())
    }

    async fn update_profile_contact(&self, id: &Uuid, request: &ProfileUpdateRequest) -> Result<Profile, AppError> {
        self.update_profile(id, |profile| {
            profile.full_name = request.full_name.clone();
            profile.phone = request.phone.clone();
        })
    }

    async fn set_profile_role(&self, id: &Uuid, role: Role) -> Result<Profile, AppError> {
        self.update_profile(id, |profile| {
            profile.role = role;
            profile.approved = role != Role::Teacher;
        })
    }

    async fn set_profile_approval(&self, id: &Uuid, approved: bool) -> Result<Profile, AppError> {
        self.update_profile(id, |profile| profile.approved = approved)
    }
}

#[async_trait::async_trait]
impl CalendarEventRepository for MockRepository {
    async fn create_calendar_event(&self, request: &CalendarEventRequest) -> Result<CalendarEvent, AppError> {
        let event = CalendarEvent {
            id: Uuid::new_v4(),
            title: request.title.clone(),
            event_type: request.event_type,
            teacher_id: request.teacher_id,
            course_id: request.course_id,
            start_time: request.start_time,
            end_time: request.end_time,
        };
        self.events.lock().unwrap().insert(event.id, event.clone());
        if let (EventType::Class, Some(teacher_id)) = (event.event_type, event.teacher_id) {
            self.insert_scheduled_attendance(teacher_id, event.id, 0);
        }
        Ok(event)
    }

    async fn get_calendar_event_by_id(&self, id: &Uuid) -> Result<Option<CalendarEvent>, AppError> {
        Ok(self.events.lock().unwrap().get(id).cloned())
    }

    async fn delete_calendar_event(&self, id: &Uuid) -> Result<bool, AppError> {
        let removed = self.events.lock().unwrap().remove(id).is_some();
        self.attendance.lock().unwrap().retain(|record| record.calendar_event_id != *id);
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl AttendanceRepository for MockRepository {
    async fn get_attendance(&self, teacher_id: &Uuid, calendar_event_id: &Uuid) -> Result<Option<AttendanceRecord>, AppError> {
        Ok(self
            .attendance
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.teacher_id == *teacher_id && record.calendar_event_id == *calendar_event_id)
            .cloned())
    }

    async fn complete_attendance(
        &self,
        teacher_id: &Uuid,
        calendar_event_id: &Uuid,
        completed_at: DateTime<Utc>,
        base_amount: i64,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::write_failed("Failed to complete attendance", sqlx::Error::PoolTimedOut));
        }

        let mut attendance = self.attendance.lock().unwrap();
        match attendance
            .iter_mut()
            .find(|record| record.teacher_id == *teacher_id && record.calendar_event_id == *calendar_event_id)
        {
            Some(record) if record.status == AttendanceStatus::Scheduled => {
                record.status = AttendanceStatus::Completed;
                record.completed_at = Some(completed_at);
                Ok(Some(record.clone()))
            }
            Some(_) => Ok(None),
            None => {
                let record = AttendanceRecord {
                    id: Uuid::new_v4(),
                    teacher_id: *teacher_id,
                    calendar_event_id: *calendar_event_id,
                    status: AttendanceStatus::Completed,
                    completed_at: Some(completed_at),
                    base_amount,
                    bonus_amount: 0,
                };
                attendance.push(record.clone());
                Ok(Some(record))
            }
        }
    }
}

/// Auth provider holding at most one session, which `MOCK_PASSWORD` signs into.
pub struct MockAuthProvider {
    session: Option<AuthSession>,
    failing: bool,
}

impl MockAuthProvider {
    pub fn signed_out() -> Self {
        Self { session: None, failing: false }
    }

    pub fn with_session(session: AuthSession) -> Self {
        Self {
            session: Some(session),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self { session: None, failing: true }
    }
}

#[async_trait::async_trait]
impl AuthProvider for MockAuthProvider {
    async fn get_session(&self) -> Result<Option<AuthSession>, AppError> {
        if self.failing {
            return Err(AppError::db("Database error", sqlx::Error::PoolTimedOut));
        }
        Ok(self.session.clone())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        match &self.session {
            Some(session) if session.user.email == email && password == MOCK_PASSWORD => Ok(session.clone()),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, email: &str, _password: &str, _attrs: &SignUpAttributes) -> Result<AuthSession, AppError> {
        Err(AppError::UserAlreadyExists(email.to_string()))
    }

    async fn refresh_session(&self, session: &AuthSession) -> Result<Option<AuthSession>, AppError> {
        Ok(Some(AuthSession {
            expires_at: session.expires_at + Duration::days(7),
            ..session.clone()
        }))
    }

    async fn sign_out(&self, _session: &AuthSession) -> Result<(), AppError> {
        Ok(())
    }
}
