use crate::models::navigation::{GuardAction, GuardDecision, GuardState};
use crate::models::profile::Role;
use crate::models::session::SessionView;
use crate::service::routing::{PENDING_APPROVAL_PATH, canonical_path, login_redirect, protected_role};
use std::time::Duration;

/// Per-role layout guard. Fails closed: anything short of a resolved profile
/// with the right role (and approval, for teachers) never renders.
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    target: Role,
    loading_timeout: Duration,
}

impl RouteGuard {
    pub fn new(target: Role, loading_timeout: Duration) -> Self {
        Self { target, loading_timeout }
    }

    /// Guard owning `path`, or `None` for public pages.
    pub fn for_path(path: &str, loading_timeout: Duration) -> Option<Self> {
        protected_role(path).map(|role| Self::new(role, loading_timeout))
    }

    pub fn target(&self) -> Role {
        self.target
    }

    /// `waited` is how long the guard has been showing a spinner.
    pub fn evaluate(&self, view: &SessionView, waited: Duration, intended_path: &str) -> GuardDecision {
        let timed_out = waited >= self.loading_timeout;

        if view.is_loading {
            return if timed_out {
                tracing::warn!(target_role = ?self.target, waited_ms = waited.as_millis() as u64, "session resolution timed out");
                redirect(GuardState::NoUser, login_redirect(intended_path))
            } else {
                spinner(GuardState::Loading)
            };
        }

        if view.user.is_none() {
            return redirect(GuardState::NoUser, login_redirect(intended_path));
        }

        let Some(profile) = &view.profile else {
            // A slow profile fetch should not bounce the user, a stuck one should.
            return if timed_out {
                redirect(GuardState::NoUser, login_redirect(intended_path))
            } else {
                spinner(GuardState::NoProfile)
            };
        };

        if profile.role != self.target {
            return redirect(GuardState::WrongRole, canonical_path(Some(profile.role), profile.approved).to_string());
        }

        if self.target == Role::Teacher && !profile.approved {
            return redirect(GuardState::Unapproved, PENDING_APPROVAL_PATH.to_string());
        }

        GuardDecision {
            state: GuardState::Authorized,
            action: GuardAction::Render,
        }
    }
}

fn spinner(state: GuardState) -> GuardDecision {
    GuardDecision {
        state,
        action: GuardAction::Spinner,
    }
}

fn redirect(state: GuardState, location: String) -> GuardDecision {
    GuardDecision {
        state,
        action: GuardAction::Redirect(location),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::SessionView;
    use crate::service::routing::{ADMIN_ROOT_PATH, STUDENT_DASHBOARD_PATH};
    use crate::test_utils::{sample_profile, sample_session};

    const TIMEOUT: Duration = Duration::from_secs(20);

    fn signed_in(role: Role, approved: bool) -> SessionView {
        let profile = sample_profile(role, approved);
        let session = sample_session(&profile);
        SessionView {
            user: Some(session.user.clone()),
            session: Some(session),
            profile: Some(profile),
            is_loading: false,
        }
    }

    fn without_profile() -> SessionView {
        SessionView {
            profile: None,
            ..signed_in(Role::Student, true)
        }
    }

    #[test]
    fn loading_shows_spinner_without_redirect() {
        let guard = RouteGuard::new(Role::Student, TIMEOUT);
        let view = SessionView {
            is_loading: true,
            ..SessionView::default()
        };
        let decision = guard.evaluate(&view, Duration::from_secs(1), "/student/dashboard");
        assert_eq!(decision.state, GuardState::Loading);
        assert_eq!(decision.action, GuardAction::Spinner);
    }

    #[test]
    fn loading_past_timeout_forces_login() {
        let guard = RouteGuard::new(Role::Admin, TIMEOUT);
        let view = SessionView {
            is_loading: true,
            ..SessionView::default()
        };
        let decision = guard.evaluate(&view, TIMEOUT, "/admin/users");
        assert_eq!(decision.state, GuardState::NoUser);
        assert_eq!(decision.action, GuardAction::Redirect("/login?redirect=%2Fadmin%2Fusers".to_string()));
    }

    #[test]
    fn missing_user_redirects_to_login_with_intended_path() {
        let guard = RouteGuard::new(Role::Teacher, TIMEOUT);
        let decision = guard.evaluate(&SessionView::default(), Duration::ZERO, "/teacher/classes");
        assert_eq!(decision.state, GuardState::NoUser);
        assert_eq!(decision.action, GuardAction::Redirect("/login?redirect=%2Fteacher%2Fclasses".to_string()));
    }

    #[test]
    fn missing_profile_never_authorizes() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            let guard = RouteGuard::new(role, TIMEOUT);
            let pending = guard.evaluate(&without_profile(), Duration::from_secs(2), "/x");
            assert_eq!(pending.state, GuardState::NoProfile);
            assert!(!pending.is_authorized());

            let stuck = guard.evaluate(&without_profile(), TIMEOUT + Duration::from_secs(1), "/x");
            assert_eq!(stuck.state, GuardState::NoUser);
            assert!(!stuck.is_authorized());
        }
    }

    #[test]
    fn wrong_role_goes_to_own_dashboard() {
        let guard = RouteGuard::new(Role::Admin, TIMEOUT);
        let decision = guard.evaluate(&signed_in(Role::Student, true), Duration::ZERO, "/admin");
        assert_eq!(decision.state, GuardState::WrongRole);
        assert_eq!(decision.action, GuardAction::Redirect(STUDENT_DASHBOARD_PATH.to_string()));

        let guard = RouteGuard::new(Role::Student, TIMEOUT);
        let decision = guard.evaluate(&signed_in(Role::Admin, true), Duration::ZERO, "/student");
        assert_eq!(decision.action, GuardAction::Redirect(ADMIN_ROOT_PATH.to_string()));
    }

    #[test]
    fn unapproved_teacher_goes_to_pending_approval() {
        let guard = RouteGuard::new(Role::Teacher, TIMEOUT);
        let decision = guard.evaluate(&signed_in(Role::Teacher, false), Duration::ZERO, "/teacher/dashboard");
        assert_eq!(decision.state, GuardState::Unapproved);
        assert_eq!(decision.action, GuardAction::Redirect(PENDING_APPROVAL_PATH.to_string()));
    }

    #[test]
    fn matching_role_renders() {
        for (role, path) in [(Role::Student, "/student"), (Role::Teacher, "/teacher"), (Role::Admin, "/admin")] {
            let guard = RouteGuard::for_path(path, TIMEOUT).unwrap();
            assert_eq!(guard.target(), role);
            let decision = guard.evaluate(&signed_in(role, true), Duration::ZERO, path);
            assert!(decision.is_authorized());
            assert_eq!(decision.action, GuardAction::Render);
        }
    }

    #[test]
    fn public_paths_have_no_guard() {
        assert!(RouteGuard::for_path("/courses", TIMEOUT).is_none());
    }
}
