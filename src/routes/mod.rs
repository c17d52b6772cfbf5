pub mod auth;
pub mod calendar_event;
pub mod error;
pub mod health;
pub mod navigation;
pub mod profile;
pub mod submission;
pub mod teacher;
