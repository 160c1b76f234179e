//! JSON bodies exchanged with the backend's `/auth/*` endpoints.

use serde::{Deserialize, Serialize};

use crate::session::Role;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Answer to a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
    #[serde(default = "default_token_type", alias = "tokenType")]
    pub token_type: String,
    pub role: Role,
    #[serde(alias = "displayName")]
    pub name: String,
    #[serde(alias = "userId", alias = "subjectId", alias = "subject_id")]
    pub user_id: String,
}

/// Answer to `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct RefreshResponse {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}
