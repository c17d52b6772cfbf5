pub mod attendance;
pub mod calendar_event;
pub mod postgres_repository;
pub mod profile;
pub mod session;
pub mod submission;
pub mod user;
