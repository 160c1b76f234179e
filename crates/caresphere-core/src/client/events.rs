//! Session lifecycle notifications.

use crate::session::Role;

/// Broadcast whenever the session changes hands.
///
/// The request client never navigates; listeners (the router, or whatever
/// owns navigation) turn these into redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login or registration exchange succeeded.
    SignedIn { role: Role },
    /// The token pair was rotated by a refresh exchange.
    Refreshed,
    /// The user logged out.
    SignedOut,
    /// Credentials could not be recovered and the session was cleared.
    Invalidated { reason: String },
}

impl SessionEvent {
    /// Whether the session is gone after this event.
    #[must_use]
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::SignedOut | Self::Invalidated { .. })
    }
}
