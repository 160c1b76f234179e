//! CareSphere Core - session and authorization gateway for the CareSphere portal.
//!
//! This crate provides:
//! - The Session Store: the persisted record of who is signed in
//! - The Authenticated Request Client: bearer injection and token refresh
//! - The Role Router: role-based navigation guards
//! - Configuration management and error handling
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use caresphere_core::{ApiRequest, GatewayClient, GatewayConfig, RoleRouter, SessionStore};
//! use caresphere_core::session::FileSlots;
//!
//! #[tokio::main]
//! async fn main() -> caresphere_core::Result<()> {
//!     let config = GatewayConfig::discover_and_load()?;
//!     let store = Arc::new(SessionStore::new(Arc::new(FileSlots::with_path(FileSlots::default_path()?))));
//!     let client = GatewayClient::new(&config, Arc::clone(&store))?;
//!     let router = RoleRouter::new(store);
//!
//!     let session = client.login("asha@example.test", "secret1").await?;
//!     println!("{:?}", router.navigate("/patient/profile"));
//!
//!     let profile = client.send(ApiRequest::get("/patient/profile")).await?.error_for_status()?;
//!     println!("{}", profile.text());
//!     # let _ = session;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod router;
pub mod session;

pub use auth::{RegisterForm, TokenResponse};
pub use client::{ApiRequest, ApiResponse, GatewayClient, Method, RefreshFailure, SessionEvent, StatusCode};
pub use config::{ConfigError, GatewayConfig};
pub use error::{GatewayError, Result};
pub use router::{Decision, GuardState, Redirect, RoleRouter, Route};
pub use session::{Identity, Role, Session, SessionStore, SessionSummary, StoreError, TokenPair};
