//! Navigation guard over the persisted session.

use std::sync::Arc;

use tracing::debug;

use crate::client::SessionEvent;
use crate::session::{Role, Session, SessionStore};

use super::routes::{Route, normalize_path};

/// Login surface.
pub const LOGIN_PATH: &str = "/login";

/// Landing surface; unknown paths are sent here.
pub const LANDING_PATH: &str = "/";

/// Authentication state as seen by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Anonymous,
    AuthenticatedAs(Role),
}

impl From<&Session> for GuardState {
    fn from(session: &Session) -> Self {
        match session.role() {
            Some(role) if session.is_authenticated() => Self::AuthenticatedAs(role),
            _ => Self::Anonymous,
        }
    }
}

/// Where to send the user instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Path to come back to after a successful login.
    ///
    /// Normalised by [`normalize_path`]: the query string and fragment of
    /// the requested location are not kept.
    pub return_to: Option<String>,
}

impl Redirect {
    fn to(path: &str) -> Self {
        Self { to: path.to_string(), return_to: None }
    }

    fn to_login(return_to: String) -> Self {
        Self { to: LOGIN_PATH.to_string(), return_to: Some(return_to) }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Render(Route),
    Redirect(Redirect),
}

/// Gates navigation by role.
///
/// Holds no copy of the session: every decision reads the store, so a logout
/// or an invalidated refresh is visible on the very next navigation.
pub struct RoleRouter {
    store: Arc<SessionStore>,
}

impl RoleRouter {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Current guard state.
    pub fn state(&self) -> GuardState {
        GuardState::from(&self.store.read())
    }

    /// Decides what happens when the user navigates to `path`.
    pub fn navigate(&self, path: &str) -> Decision {
        let state = self.state();
        let decision = Self::decide(state, path);
        debug!(path = %path, ?state, ?decision, "Navigation decided");
        decision
    }

    /// Pure guard logic.
    pub fn decide(state: GuardState, path: &str) -> Decision {
        let path = normalize_path(path);
        let Some(route) = Route::parse(&path) else {
            return Decision::Redirect(Redirect::to(LANDING_PATH));
        };

        match (route.required_role(), state) {
            // Public screens: landing and the auth forms send signed-in users home.
            (None, GuardState::Anonymous) => Decision::Render(route),
            (None, GuardState::AuthenticatedAs(role)) => Decision::Redirect(Redirect::to(role.home_path())),

            (Some(_), GuardState::Anonymous) => Decision::Redirect(Redirect::to_login(path)),
            (Some(required), GuardState::AuthenticatedAs(role)) if required == role => Decision::Render(route),
            (Some(_), GuardState::AuthenticatedAs(role)) => Decision::Redirect(Redirect::to(role.home_path())),
        }
    }

    /// Where a user who just signed in as `role` should land.
    ///
    /// The remembered path wins only when `role` may actually see it;
    /// otherwise the role's home.
    pub fn post_login_destination(role: Role, return_to: Option<&str>) -> String {
        if let Some(path) = return_to {
            if let Decision::Render(route) = Self::decide(GuardState::AuthenticatedAs(role), path) {
                if route.required_role() == Some(role) {
                    return route.path();
                }
            }
        }
        role.home_path().to_string()
    }

    /// Navigation side effect of a session event, if any.
    pub fn redirect_for_event(event: &SessionEvent) -> Option<Redirect> {
        match event {
            SessionEvent::Invalidated { .. } | SessionEvent::SignedOut => Some(Redirect::to(LOGIN_PATH)),
            SessionEvent::SignedIn { role } => Some(Redirect::to(role.home_path())),
            SessionEvent::Refreshed => None,
        }
    }
}
