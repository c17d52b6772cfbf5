use crate::models::profile::Role;
use crate::models::session::SessionView;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";
pub const STUDENT_DASHBOARD_PATH: &str = "/student/dashboard";
pub const TEACHER_DASHBOARD_PATH: &str = "/teacher/dashboard";
pub const PENDING_APPROVAL_PATH: &str = "/pending-approval";
pub const ADMIN_ROOT_PATH: &str = "/admin";

/// The single post-login destination for a role/approval pair.
/// Every guard and redirect goes through here.
pub fn canonical_path(role: Option<Role>, approved: bool) -> &'static str {
    match role {
        Some(Role::Student) => STUDENT_DASHBOARD_PATH,
        Some(Role::Teacher) if approved => TEACHER_DASHBOARD_PATH,
        Some(Role::Teacher) => PENDING_APPROVAL_PATH,
        Some(Role::Admin) => ADMIN_ROOT_PATH,
        None => HOME_PATH,
    }
}

/// Destination for a resolved session; home until a profile is known.
pub fn canonical_path_for(view: &SessionView) -> &'static str {
    match &view.profile {
        Some(profile) => canonical_path(Some(profile.role), profile.approved),
        None => canonical_path(None, false),
    }
}

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// Root, login and every signup page.
pub fn is_entry_path(path: &str) -> bool {
    let path = strip_query(path);
    path == HOME_PATH || path == LOGIN_PATH || has_segment_prefix(path, SIGNUP_PATH) || path.starts_with("/signup-")
}

/// Role whose guard owns `path`, if any.
pub fn protected_role(path: &str) -> Option<Role> {
    let path = strip_query(path);
    if has_segment_prefix(path, "/student") {
        Some(Role::Student)
    } else if has_segment_prefix(path, "/teacher") {
        Some(Role::Teacher)
    } else if has_segment_prefix(path, ADMIN_ROOT_PATH) {
        Some(Role::Admin)
    } else {
        None
    }
}

pub fn is_protected_path(path: &str) -> bool {
    protected_role(path).is_some() || strip_query(path) == PENDING_APPROVAL_PATH
}

/// Login route carrying the page the user was trying to reach.
pub fn login_redirect(intended_path: &str) -> String {
    if intended_path.is_empty() || is_entry_path(intended_path) {
        return LOGIN_PATH.to_string();
    }
    format!("{}?redirect={}", LOGIN_PATH, urlencoding::encode(intended_path))
}
