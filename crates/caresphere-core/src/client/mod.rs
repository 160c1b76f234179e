//! Authenticated Request Client.
//!
//! Every call goes out with the current access token as a bearer credential.
//! A 401 triggers one refresh exchange and one retry; if the refresh cannot
//! be completed the session is cleared, [`SessionEvent::Invalidated`] is
//! broadcast once and every caller waiting on that refresh receives
//! [`GatewayError::SessionExpired`].
//!
//! Concurrent 401s share a single refresh: requests queue on a refresh gate
//! and the first one through performs the exchange. The others find the
//! stored access token already differs from the one they were rejected with
//! and retry with it directly.

mod events;
mod request;
mod response;

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use crate::auth::exchange_refresh;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::session::{Session, SessionStore};

pub use events::SessionEvent;
pub use request::{ApiRequest, RequestBody};
pub use response::ApiResponse;
pub use reqwest::{Method, StatusCode};

/// Capacity of the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Where a request is in its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// First dispatch.
    Initial,
    /// Re-sent once after a successful refresh; never retried again.
    Retried,
}

/// Why credentials could not be recovered after a 401.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshFailure {
    /// There is no live session to refresh.
    #[error("no active session")]
    SignedOut,

    /// The session has no refresh token.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The backend refused the refresh token.
    #[error("refresh rejected with {status}: {detail}")]
    Rejected { status: StatusCode, detail: String },

    /// The refresh exchange did not complete.
    #[error("refresh exchange failed: {0}")]
    Transport(String),

    /// The refresh answer did not carry a usable token pair.
    #[error("malformed refresh response: {0}")]
    Malformed(String),

    /// The rotated pair could not be persisted.
    #[error("could not persist refreshed tokens: {0}")]
    Storage(String),

    /// The refresh task stopped before finishing.
    #[error("refresh task aborted: {0}")]
    Aborted(String),
}

pub(crate) struct Inner {
    pub(crate) http: reqwest::Client,
    base_url: String,
    pub(crate) store: Arc<SessionStore>,
    pub(crate) events: broadcast::Sender<SessionEvent>,
    /// Serialises refresh exchanges and identity changes.
    pub(crate) refresh_gate: Mutex<()>,
}

/// Gateway between pages and the backend API.
///
/// Cheap to clone; clones share the session store, the event channel and the
/// refresh gate.
#[derive(Clone)]
pub struct GatewayClient {
    pub(crate) inner: Arc<Inner>,
}

impl GatewayClient {
    /// Creates a client for the backend named in `config`.
    pub fn new(config: &GatewayConfig, store: Arc<SessionStore>) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self::with_http(http, &config.api_url, store))
    }

    /// Creates a client around an existing HTTP client.
    pub fn with_http(http: reqwest::Client, api_url: &str, store: Arc<SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: api_url.trim_end_matches('/').to_string(),
                store,
                events,
                refresh_gate: Mutex::new(()),
            }),
        }
    }

    /// The session store this client reads and writes.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.inner.store
    }

    /// Current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner.store.read()
    }

    /// Subscribes to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Sends a request with the current credentials, recovering once from an
    /// expired access token.
    ///
    /// Every answer other than a recoverable 401 is returned unmodified,
    /// including error statuses and a 401 on the retried attempt.
    ///
    /// # Errors
    ///
    /// [`GatewayError::SessionExpired`] when the refresh could not be
    /// completed (the session has been cleared by then);
    /// [`GatewayError::Transport`] when the backend could not be reached.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut attempt = Attempt::Initial;
        let mut token = self.inner.store.read().access_token().map(str::to_owned);

        loop {
            let response = self.inner.dispatch(&request, token.as_deref()).await?;
            if response.status() != StatusCode::UNAUTHORIZED || attempt == Attempt::Retried {
                return Ok(response);
            }

            debug!(method = %request.method(), path = %request.path(), "Access token rejected, refreshing");
            match self.renew(token.take()).await {
                Ok(fresh) => {
                    token = Some(fresh);
                    attempt = Attempt::Retried;
                }
                Err(failure) => {
                    debug!(reason = %failure, "Credentials not recovered");
                    return Err(GatewayError::SessionExpired {
                        status: response.status(),
                        detail: response.detail(),
                    });
                }
            }
        }
    }

    /// Runs the refresh on its own task so an abandoned caller cannot drop a
    /// pair the backend has already rotated.
    async fn renew(&self, stale: Option<String>) -> std::result::Result<String, RefreshFailure> {
        let inner = Arc::clone(&self.inner);
        match tokio::spawn(async move { inner.renew(stale).await }).await {
            Ok(result) => result,
            Err(e) => {
                let failure = RefreshFailure::Aborted(e.to_string());
                let _gate = self.inner.refresh_gate.lock().await;
                self.inner.invalidate(&failure);
                Err(failure)
            }
        }
    }
}

impl Inner {
    pub(crate) fn url(&self, path: &str) -> Result<reqwest::Url> {
        let joined = format!("{}{}", self.base_url, path);
        reqwest::Url::parse(&joined).map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", joined, e)))
    }

    /// Sends `request` once, with `token` as bearer credential if present.
    pub(crate) async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<ApiResponse> {
        let url = self.url(request.path())?;
        let mut builder = self.http.request(request.method().clone(), url);

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body_ref() {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Raw { content_type, data }) => {
                builder.header(CONTENT_TYPE, content_type.as_str()).body(data.clone())
            }
            None => builder,
        };

        debug!(method = %request.method(), path = %request.path(), bearer = token.is_some(), "Dispatching request");
        let response = builder.send().await?;
        ApiResponse::read(response).await
    }

    /// Recovers credentials after a 401 seen with `stale`.
    ///
    /// Everything happens under the refresh gate, including the invalidation
    /// of a failed refresh: a request queued behind a failed exchange finds
    /// the session already cleared and never repeats the exchange.
    async fn renew(&self, stale: Option<String>) -> std::result::Result<String, RefreshFailure> {
        let _gate = self.refresh_gate.lock().await;

        let session = self.store.read();
        let Some(current) = session.access_token().filter(|_| session.is_authenticated()) else {
            return Err(RefreshFailure::SignedOut);
        };
        if stale.as_deref() != Some(current) {
            debug!("Access token already rotated by a concurrent request");
            return Ok(current.to_owned());
        }

        match self.rotate(&session).await {
            Ok(access_token) => Ok(access_token),
            Err(RefreshFailure::SignedOut) => Err(RefreshFailure::SignedOut),
            Err(failure) => {
                self.invalidate(&failure);
                Err(failure)
            }
        }
    }

    /// Exchanges the session's refresh token and stores the new pair.
    async fn rotate(&self, session: &Session) -> std::result::Result<String, RefreshFailure> {
        let Some(refresh_token) = session.refresh_token() else {
            return Err(RefreshFailure::MissingRefreshToken);
        };

        let tokens = exchange_refresh(self, refresh_token).await?;
        match self.store.rotate(&tokens) {
            Ok(true) => {}
            Ok(false) => return Err(RefreshFailure::SignedOut),
            Err(e) => return Err(RefreshFailure::Storage(e.to_string())),
        }

        info!("Access token refreshed");
        let _ = self.events.send(SessionEvent::Refreshed);
        Ok(tokens.access_token)
    }

    /// Clears the session and tells listeners. Callers hold the refresh gate.
    fn invalidate(&self, failure: &RefreshFailure) {
        warn!(reason = %failure, "Session invalidated");
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear invalidated session");
        }
        let _ = self.events.send(SessionEvent::Invalidated { reason: failure.to_string() });
    }
}
