//! Auth exchanges with the backend collaborator.
//!
//! Login, registration and logout go straight to `/auth/*` without the 401
//! interceptor: a 401 from `/auth/login` means wrong credentials, not an
//! expired session.

mod register;
mod wire;

use tracing::{debug, info, warn};

use crate::client::{ApiRequest, GatewayClient, Inner, RefreshFailure, SessionEvent};
use crate::error::{GatewayError, Result};
use crate::session::{Identity, Session, TokenPair};

pub use register::{DEFAULT_SPECIALIZATION, MIN_PASSWORD_LEN, RegisterForm, SPECIALIZATIONS};
pub use wire::{RegisterRequest, TokenResponse};

use wire::{LoginRequest, RefreshRequest, RefreshResponse};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";

impl GatewayClient {
    /// Signs in with email and password and persists the new session.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Validation`] for blank input, [`GatewayError::Api`] when
    /// the backend refuses the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(GatewayError::Validation("Email and password are required.".to_string()));
        }

        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest { email, password })?;
        let response = self.inner.dispatch(&request, None).await?.error_for_status()?;
        let answer: TokenResponse = response.json()?;
        self.establish(answer, email.to_string()).await
    }

    /// Registers a new account and signs it in.
    pub async fn register(&self, form: &RegisterForm) -> Result<Session> {
        let body = form.validate()?;
        let request = ApiRequest::post(REGISTER_PATH).json(&body)?;
        let response = self.inner.dispatch(&request, None).await?.error_for_status()?;
        let answer: TokenResponse = response.json()?;
        self.establish(answer, body.email).await
    }

    /// Logs out locally, telling the backend to revoke the refresh token on a
    /// best-effort basis.
    pub async fn logout(&self) -> Result<()> {
        let _gate = self.inner.refresh_gate.lock().await;
        let session = self.inner.store.read();

        if let Some(refresh_token) = session.refresh_token() {
            let request = ApiRequest::post(LOGOUT_PATH).json(&RefreshRequest { refresh_token })?;
            match self.inner.dispatch(&request, session.access_token()).await {
                Ok(response) if response.is_success() => debug!("Refresh token revoked"),
                Ok(response) => warn!(status = %response.status(), "Backend logout refused, clearing locally"),
                Err(e) => warn!(error = %e, "Backend logout failed, clearing locally"),
            }
        }

        self.inner.store.clear()?;
        info!("Signed out");
        let _ = self.inner.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    async fn establish(&self, answer: TokenResponse, email: String) -> Result<Session> {
        let identity = Identity {
            role: answer.role,
            subject_id: answer.user_id,
            display_name: Some(answer.name),
            email: Some(email),
        };
        let tokens = TokenPair::new(answer.access_token, answer.refresh_token);

        {
            let _gate = self.inner.refresh_gate.lock().await;
            self.inner.store.write(&identity, &tokens)?;
        }

        info!(role = %identity.role, subject_id = %identity.subject_id, "Signed in");
        let _ = self.inner.events.send(SessionEvent::SignedIn { role: identity.role });
        Ok(Session::authenticated(identity, tokens))
    }
}

/// Trades a refresh token for a new pair. The old refresh token is consumed
/// whether or not the caller manages to store the answer.
pub(crate) async fn exchange_refresh(
    inner: &Inner,
    refresh_token: &str,
) -> std::result::Result<TokenPair, RefreshFailure> {
    let request = ApiRequest::post(REFRESH_PATH)
        .json(&RefreshRequest { refresh_token })
        .map_err(|e| RefreshFailure::Malformed(e.to_string()))?;

    let response = inner
        .dispatch(&request, None)
        .await
        .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

    if !response.is_success() {
        return Err(RefreshFailure::Rejected { status: response.status(), detail: response.detail() });
    }

    let answer: RefreshResponse = response.json().map_err(|e| RefreshFailure::Malformed(e.to_string()))?;
    if answer.access_token.is_empty() || answer.refresh_token.is_empty() {
        return Err(RefreshFailure::Malformed("empty token in refresh response".to_string()));
    }
    Ok(TokenPair::new(answer.access_token, answer.refresh_token))
}
