use crate::database::profile::ProfileRepository;
use crate::error::app_error::AppError;
use crate::models::profile::Profile;
use crate::models::session::{AuthEvent, AuthSession, AuthUser, Navigation, SessionView};
use crate::models::user::SignUpAttributes;
use crate::service::auth_provider::AuthProvider;
use crate::service::profile_cache::ProfileCache;
use crate::service::routing::{LOGIN_PATH, canonical_path_for, is_entry_path, is_protected_path};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Turns the auth provider's session into the `{ user, profile, session,
/// is_loading }` view every route guard reads, and issues the redirect that
/// follows a sign-in or sign-out.
///
/// State-changing methods take `&mut self`, so auth events are applied one at
/// a time in the order they are delivered and a sign-out can never be
/// overwritten by a profile fetch that started before it.
///
/// None of the session methods return errors: failures are logged and folded
/// into an empty view. Only the credential pass-throughs (`sign_in`,
/// `sign_up`, `sign_out`) surface the provider's error unchanged.
pub struct SessionResolver<A, P> {
    auth: A,
    profiles: P,
    cache: Arc<ProfileCache>,
    view: SessionView,
}

impl<A, P> SessionResolver<A, P>
where
    A: AuthProvider,
    P: ProfileRepository + Send + Sync,
{
    pub fn new(auth: A, profiles: P, cache: Arc<ProfileCache>) -> Self {
        Self {
            auth,
            profiles,
            cache,
            view: SessionView {
                is_loading: true,
                ..SessionView::default()
            },
        }
    }

    pub fn view(&self) -> &SessionView {
        &self.view
    }

    pub fn into_view(self) -> SessionView {
        self.view
    }

    /// Destination for the current view; home when no profile is resolved.
    pub fn canonical_path(&self) -> &'static str {
        canonical_path_for(&self.view)
    }

    /// Reads any existing session. Provider failures count as "no session".
    pub async fn initialize(&mut self) -> (Option<AuthSession>, Option<AuthUser>) {
        self.view.is_loading = true;

        let session = match self.auth.get_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = ?err, "failed to read session, continuing signed out");
                None
            }
        };

        self.apply_session(session).await;
        self.view.is_loading = false;

        (self.view.session.clone(), self.view.user.clone())
    }

    /// Cached profile if live, otherwise exactly one fetch. Never errors.
    pub async fn resolve_profile(&self, user_id: &Uuid) -> Option<Profile> {
        if let Some(profile) = self.cache.get(user_id).await {
            debug!(user_id = %user_id, "profile served from cache");
            return Some(profile);
        }

        match self.profiles.get_profile_by_id(user_id).await {
            Ok(Some(profile)) => {
                self.cache.insert(profile.clone()).await;
                Some(profile)
            }
            Ok(None) => {
                warn!(user_id = %user_id, "authenticated user has no profile");
                None
            }
            Err(err) => {
                warn!(user_id = %user_id, error = ?err, "profile fetch failed");
                None
            }
        }
    }

    /// Applies an auth event and returns where the client should go next, if
    /// anywhere. `current_path` is the page the client is on.
    pub async fn on_auth_state_change(&mut self, event: AuthEvent, session: Option<AuthSession>, current_path: &str) -> Option<Navigation> {
        match (event, session) {
            (AuthEvent::SignedOut, _) | (_, None) => {
                self.view = SessionView::default();
                // Every user's entry goes, not only the one signing out.
                self.cache.clear().await;
                info!(event = ?event, "session cleared");

                is_protected_path(current_path).then(|| Navigation {
                    path: LOGIN_PATH.to_string(),
                    hard: true,
                })
            }
            (AuthEvent::SignedIn | AuthEvent::TokenRefreshed, Some(session)) => {
                self.apply_session(Some(session)).await;
                self.view.is_loading = false;

                if !is_entry_path(current_path) {
                    return None;
                }

                let target = self.canonical_path();
                debug!(event = ?event, from = current_path, to = target, "post-auth redirect");
                (target != current_path).then(|| Navigation {
                    path: target.to_string(),
                    hard: false,
                })
            }
        }
    }

    /// Drops the current user's cache entry and fetches the profile again.
    pub async fn refresh_profile(&mut self) -> Option<Profile> {
        let user_id = self.view.user.as_ref()?.id;
        self.cache.invalidate(&user_id).await;
        self.view.profile = self.resolve_profile(&user_id).await;
        self.view.profile.clone()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        self.auth.sign_in_with_password(email, password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str, attrs: &SignUpAttributes) -> Result<AuthSession, AppError> {
        self.auth.sign_up(email, password, attrs).await
    }

    /// Renews the current session with the provider. `None` once it has lapsed.
    pub async fn refresh_session(&self) -> Result<Option<AuthSession>, AppError> {
        match &self.view.session {
            Some(session) => self.auth.refresh_session(session).await,
            None => Ok(None),
        }
    }

    pub async fn sign_out(&self) -> Result<(), AppError> {
        match &self.view.session {
            Some(session) => self.auth.sign_out(session).await,
            None => Ok(()),
        }
    }

    async fn apply_session(&mut self, session: Option<AuthSession>) {
        let user = session.as_ref().map(|s| s.user.clone());
        let profile = match &user {
            Some(user) => self.resolve_profile(&user.id).await,
            None => None,
        };

        self.view.session = session;
        self.view.user = user;
        self.view.profile = profile;
    }
}
