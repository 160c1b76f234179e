//! Session data model.

use serde::{Deserialize, Serialize};

/// Portal variant a user signs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Patient portal.
    Patient,
    /// Doctor portal.
    Doctor,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
        }
    }

    /// Parses a role from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "patient" => Some(Self::Patient),
            "doctor" => Some(Self::Doctor),
            _ => None,
        }
    }

    /// Root path of this role's area.
    #[must_use]
    pub fn home_path(self) -> &'static str {
        match self {
            Self::Patient => "/patient",
            Self::Doctor => "/doctor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is signed in, as reported by the backend at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub role: Role,
    pub subject_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Access/refresh credential pair. Opaque to the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

// Tokens never show up in logs.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// The client's record of authentication state.
///
/// A session is authenticated exactly when `role`, `subject_id` and
/// `access_token` are all present. The only ways to build one are
/// [`Session::anonymous`] and [`Session::authenticated`], so the invariant
/// holds for every value in circulation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    role: Option<Role>,
    subject_id: Option<String>,
    display_name: Option<String>,
    email: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Session {
    /// The unauthenticated session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated session for `identity` holding `tokens`.
    #[must_use]
    pub fn authenticated(identity: Identity, tokens: TokenPair) -> Self {
        Self {
            role: Some(identity.role),
            subject_id: Some(identity.subject_id),
            display_name: identity.display_name,
            email: identity.email,
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
        }
    }

    pub(crate) fn from_parts(identity: Identity, access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            role: Some(identity.role),
            subject_id: Some(identity.subject_id),
            display_name: identity.display_name,
            email: identity.email,
            access_token: Some(access_token),
            refresh_token,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.role.is_some() && self.subject_id.is_some() && self.access_token.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    #[must_use]
    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Identity part of the session, if authenticated.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        if !self.is_authenticated() {
            return None;
        }
        Some(Identity {
            role: self.role?,
            subject_id: self.subject_id.clone()?,
            display_name: self.display_name.clone(),
            email: self.email.clone(),
        })
    }

    /// Public view of the session, without credentials.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            authenticated: self.is_authenticated(),
            role: self.role,
            subject_id: self.subject_id.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("role", &self.role)
            .field("subject_id", &self.subject_id)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Serializable session status for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub authenticated: bool,
    pub role: Option<Role>,
    pub subject_id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
}
