pub mod attendance;
pub mod calendar_event;
pub mod health;
pub mod navigation;
pub mod profile;
pub mod session;
pub mod submission;
pub mod user;
