//! Error types for the CareSphere gateway.

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;
use crate::session::StoreError;

/// Errors surfaced by the gateway to its callers.
///
/// Only session-fatal failures are produced by the gateway itself; every other
/// backend answer is handed back as an [`ApiResponse`](crate::client::ApiResponse)
/// and turned into [`GatewayError::Api`] only when the caller asks for it.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Network-level failure talking to the backend.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP answer from the backend.
    #[error("Request failed with {status}: {detail}")]
    Api { status: StatusCode, detail: String },

    /// Credentials could not be recovered; the session has been cleared.
    #[error("Session expired ({status}): {detail}")]
    SessionExpired { status: StatusCode, detail: String },

    /// Client-side rejection of a form before anything was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The persisted session could not be written.
    #[error("Session storage error: {0}")]
    Storage(#[from] StoreError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL or a request path could not be joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl GatewayError {
    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } | Self::SessionExpired { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the caller lost its session because of this error.
    #[must_use]
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
