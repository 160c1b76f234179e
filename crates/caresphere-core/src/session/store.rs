//! Session Store: the single durable record of who is signed in.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use super::slots::{
    ACCESS_TOKEN_SLOT, IDENTITY_SLOT, REFRESH_TOKEN_SLOT, SlotStore, Slots, StoreResult,
};
use super::state::{Identity, Session, TokenPair};

/// Owns the persisted session.
///
/// Reads never fail: a missing, partial or unparseable record is the
/// anonymous session. Writes replace the whole record under a lock, so
/// concurrent callers see only complete records and the last full write wins.
pub struct SessionStore {
    slots: Arc<dyn SlotStore>,
    lock: Mutex<()>,
}

impl SessionStore {
    /// Creates a store over the given persistence medium.
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots, lock: Mutex::new(()) }
    }

    /// Reads the current session.
    pub fn read(&self) -> Session {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_unlocked()
    }

    /// Persists a new authenticated session.
    pub fn write(&self, identity: &Identity, tokens: &TokenPair) -> StoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.slots.replace(encode(identity, tokens)?)?;
        debug!(role = %identity.role, subject_id = %identity.subject_id, "Session written");
        Ok(())
    }

    /// Replaces both tokens of the current session, keeping its identity.
    ///
    /// Returns `false` without writing when no session is live, so a refresh
    /// that completes after a logout cannot bring the session back.
    pub fn rotate(&self, tokens: &TokenPair) -> StoreResult<bool> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(identity) = self.read_unlocked().identity() else {
            return Ok(false);
        };
        self.slots.replace(encode(&identity, tokens)?)?;
        debug!(subject_id = %identity.subject_id, "Session tokens rotated");
        Ok(true)
    }

    /// Resets to the anonymous session.
    pub fn clear(&self) -> StoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.slots.replace(Slots::new())?;
        debug!("Session cleared");
        Ok(())
    }

    fn read_unlocked(&self) -> Session {
        let slots = match self.slots.load() {
            Ok(slots) => slots,
            Err(e) => {
                warn!(error = %e, "Persisted session unreadable, treating as signed out");
                return Session::anonymous();
            }
        };
        decode(&slots)
    }
}

fn encode(identity: &Identity, tokens: &TokenPair) -> StoreResult<Slots> {
    let mut slots = Slots::new();
    slots.insert(ACCESS_TOKEN_SLOT.to_string(), tokens.access_token.clone());
    slots.insert(REFRESH_TOKEN_SLOT.to_string(), tokens.refresh_token.clone());
    slots.insert(IDENTITY_SLOT.to_string(), serde_json::to_string(identity)?);
    Ok(slots)
}

fn decode(slots: &Slots) -> Session {
    let Some(raw_identity) = slots.get(IDENTITY_SLOT) else {
        return Session::anonymous();
    };
    let identity: Identity = match serde_json::from_str(raw_identity) {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e, "Persisted identity is malformed, treating as signed out");
            return Session::anonymous();
        }
    };
    let Some(access_token) = slots.get(ACCESS_TOKEN_SLOT).filter(|t| !t.is_empty()) else {
        return Session::anonymous();
    };
    if identity.subject_id.is_empty() {
        return Session::anonymous();
    }
    let refresh_token = slots.get(REFRESH_TOKEN_SLOT).filter(|t| !t.is_empty()).cloned();

    Session::from_parts(identity, access_token.clone(), refresh_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::slots::{FileSlots, MemorySlots};
    use crate::session::state::Role;
    use tempfile::TempDir;

    fn patient() -> Identity {
        Identity {
            role: Role::Patient,
            subject_id: "p-42".to_string(),
            display_name: Some("Asha".to_string()),
            email: Some("asha@example.test".to_string()),
        }
    }

    fn store_with(slots: Slots) -> SessionStore {
        SessionStore::new(Arc::new(MemorySlots::with_slots(slots)))
    }

    fn slots(entries: &[(&str, &str)]) -> Slots {
        entries.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_empty_medium_is_anonymous() {
        let store = SessionStore::new(Arc::new(MemorySlots::new()));
        assert_eq!(store.read(), Session::anonymous());
    }

    #[test]
    fn test_write_then_read() {
        let store = SessionStore::new(Arc::new(MemorySlots::new()));
        store.write(&patient(), &TokenPair::new("a1", "r1")).unwrap();

        let session = store.read();
        assert!(session.is_authenticated());
        assert_eq!(session.role(), Some(Role::Patient));
        assert_eq!(session.subject_id(), Some("p-42"));
        assert_eq!(session.display_name(), Some("Asha"));
        assert_eq!(session.email(), Some("asha@example.test"));
        assert_eq!(session.access_token(), Some("a1"));
        assert_eq!(session.refresh_token(), Some("r1"));
    }

    #[test]
    fn test_clear_empties_every_slot() {
        let medium = Arc::new(MemorySlots::new());
        let store = SessionStore::new(medium.clone());
        store.write(&patient(), &TokenPair::new("a1", "r1")).unwrap();
        store.clear().unwrap();

        assert_eq!(store.read(), Session::anonymous());
        let remaining = medium.load().unwrap();
        assert!(remaining.get(ACCESS_TOKEN_SLOT).is_none());
        assert!(remaining.get(REFRESH_TOKEN_SLOT).is_none());
        assert!(remaining.get(IDENTITY_SLOT).is_none());
    }

    #[test]
    fn test_rotate_replaces_both_tokens() {
        let store = SessionStore::new(Arc::new(MemorySlots::new()));
        store.write(&patient(), &TokenPair::new("a1", "r1")).unwrap();

        assert!(store.rotate(&TokenPair::new("a2", "r2")).unwrap());
        let session = store.read();
        assert_eq!(session.access_token(), Some("a2"));
        assert_eq!(session.refresh_token(), Some("r2"));
        assert_eq!(session.identity(), Some(patient()));
    }

    #[test]
    fn test_rotate_after_clear_does_not_resurrect() {
        let store = SessionStore::new(Arc::new(MemorySlots::new()));
        store.write(&patient(), &TokenPair::new("a1", "r1")).unwrap();
        store.clear().unwrap();

        assert!(!store.rotate(&TokenPair::new("a2", "r2")).unwrap());
        assert!(!store.read().is_authenticated());
    }

    #[test]
    fn test_malformed_records_read_as_anonymous() {
        let cases = vec![
            slots(&[(IDENTITY_SLOT, "{ nope"), (ACCESS_TOKEN_SLOT, "a1")]),
            slots(&[(IDENTITY_SLOT, "42"), (ACCESS_TOKEN_SLOT, "a1")]),
            slots(&[(IDENTITY_SLOT, r#"{"role":"nurse","subject_id":"x"}"#), (ACCESS_TOKEN_SLOT, "a1")]),
            slots(&[(IDENTITY_SLOT, r#"{"role":"patient"}"#), (ACCESS_TOKEN_SLOT, "a1")]),
            slots(&[(IDENTITY_SLOT, r#"{"role":"patient","subject_id":""}"#), (ACCESS_TOKEN_SLOT, "a1")]),
            slots(&[(IDENTITY_SLOT, r#"{"role":"patient","subject_id":"p-1"}"#)]),
            slots(&[(IDENTITY_SLOT, r#"{"role":"patient","subject_id":"p-1"}"#), (ACCESS_TOKEN_SLOT, "")]),
            slots(&[(ACCESS_TOKEN_SLOT, "a1"), (REFRESH_TOKEN_SLOT, "r1")]),
        ];

        for case in cases {
            let store = store_with(case.clone());
            assert_eq!(store.read(), Session::anonymous(), "slots: {:?}", case);
        }
    }

    #[test]
    fn test_missing_refresh_token_still_authenticated() {
        let store = store_with(slots(&[
            (IDENTITY_SLOT, r#"{"role":"doctor","subject_id":"d-1"}"#),
            (ACCESS_TOKEN_SLOT, "a1"),
        ]));
        let session = store.read();
        assert!(session.is_authenticated());
        assert_eq!(session.refresh_token(), None);
    }

    #[test]
    fn test_corrupt_file_reads_as_anonymous() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "\u{0}\u{1}garbage").unwrap();

        let store = SessionStore::new(Arc::new(FileSlots::with_path(path)));
        assert_eq!(store.read(), Session::anonymous());
    }

    #[test]
    fn test_file_backed_session_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        let first = SessionStore::new(Arc::new(FileSlots::with_path(path.clone())));
        first.write(&patient(), &TokenPair::new("a1", "r1")).unwrap();

        let second = SessionStore::new(Arc::new(FileSlots::with_path(path)));
        assert_eq!(second.read(), first.read());
        assert!(second.read().is_authenticated());
    }

    #[test]
    fn test_concurrent_writes_never_mix_pairs() {
        let store = Arc::new(SessionStore::new(Arc::new(MemorySlots::new())));
        store.write(&patient(), &TokenPair::new("a0", "r0")).unwrap();

        let handles: Vec<_> = (1..=8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.rotate(&TokenPair::new(format!("a{i}"), format!("r{i}"))).unwrap();
                        let session = store.read();
                        let access = session.access_token().unwrap().trim_start_matches('a').to_string();
                        let refresh = session.refresh_token().unwrap().trim_start_matches('r').to_string();
                        assert_eq!(access, refresh);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
