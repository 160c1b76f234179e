//! Role Router / Guard.
//!
//! Decides which screens are reachable from the persisted session and where
//! to redirect otherwise. Decisions are synchronous: there is no loading
//! state, only `Anonymous` and `AuthenticatedAs(role)`.

mod guard;
mod routes;

pub use guard::{Decision, GuardState, LANDING_PATH, LOGIN_PATH, Redirect, RoleRouter};
pub use routes::{DoctorPage, NavLink, PatientPage, Route, nav_links, normalize_path};
