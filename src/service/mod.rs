pub mod auth_provider;
pub mod clock;
pub mod completion;
pub mod profile_cache;
pub mod route_guard;
pub mod routing;
pub mod session_resolver;
