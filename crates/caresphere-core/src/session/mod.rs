//! Session state and its persistence.
//!
//! The [`SessionStore`] is the only shared mutable resource in the gateway.
//! It is an explicit object handed to the request client and the router,
//! backed by any [`SlotStore`]: [`FileSlots`] for a durable session that
//! survives restarts, [`MemorySlots`] for embedding and tests.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use caresphere_core::session::{FileSlots, Identity, Role, SessionStore, TokenPair};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SessionStore::new(Arc::new(FileSlots::with_path(FileSlots::default_path()?)));
//!
//! let identity = Identity {
//!     role: Role::Patient,
//!     subject_id: "p-42".to_string(),
//!     display_name: Some("Asha".to_string()),
//!     email: None,
//! };
//! store.write(&identity, &TokenPair::new("access", "refresh"))?;
//! assert!(store.read().is_authenticated());
//!
//! store.clear()?;
//! # Ok(())
//! # }
//! ```

mod slots;
mod state;
mod store;

pub use slots::{
    ACCESS_TOKEN_SLOT, FileSlots, IDENTITY_SLOT, MemorySlots, REFRESH_TOKEN_SLOT, SlotStore, Slots,
    StoreError, StoreResult,
};
pub use state::{Identity, Role, Session, SessionSummary, TokenPair};
pub use store::SessionStore;
