//! Persistence medium: a small set of named string slots.
//!
//! Every mutation replaces the complete slot set, so a writer can never leave
//! an access token paired with the wrong refresh token.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Slot holding the bearer access token.
pub const ACCESS_TOKEN_SLOT: &str = "cs_access_token";
/// Slot holding the refresh token.
pub const REFRESH_TOKEN_SLOT: &str = "cs_refresh_token";
/// Slot holding the JSON identity blob.
pub const IDENTITY_SLOT: &str = "cs_user";

/// Current version of the session file format.
const SESSION_FILE_VERSION: &str = "1.0";

/// Named string slots.
pub type Slots = BTreeMap<String, String>;

/// Errors from the persistence medium.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The session file path is unusable.
    #[error("Invalid session path: {0}")]
    InvalidPath(String),
}

/// Result type alias for slot storage.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Backing medium for the session record.
///
/// `replace` must be atomic: readers observe either the old or the new slot
/// set, never a mix.
pub trait SlotStore: Send + Sync {
    /// Loads every slot. A medium that was never written yields no slots.
    fn load(&self) -> StoreResult<Slots>;

    /// Replaces every slot with `slots`.
    fn replace(&self, slots: Slots) -> StoreResult<()>;
}

/// Process-local slots.
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: Mutex<Slots>,
}

impl MemorySlots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a pre-populated slot set.
    #[must_use]
    pub fn with_slots(slots: Slots) -> Self {
        Self { slots: Mutex::new(slots) }
    }
}

impl SlotStore for MemorySlots {
    fn load(&self) -> StoreResult<Slots> {
        Ok(self.slots.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn replace(&self, slots: Slots) -> StoreResult<()> {
        *self.slots.lock().unwrap_or_else(PoisonError::into_inner) = slots;
        Ok(())
    }
}

/// On-disk layout of the session file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    /// Version of the session file format.
    version: String,
    /// Slot name to value.
    slots: Slots,
    /// Last write, RFC 3339.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: time::OffsetDateTime,
}

/// Slots persisted as a single JSON document.
///
/// The file is written to a temporary sibling and renamed into place, with
/// permissions 0600 (and 0700 on the parent directory) on unix.
#[derive(Debug, Clone)]
pub struct FileSlots {
    file_path: PathBuf,
}

impl FileSlots {
    /// Creates a file-backed slot store at `path`. Nothing is touched until
    /// the first write.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { file_path: path.into() }
    }

    /// Returns the default session path (`~/.caresphere/session.json`).
    pub fn default_path() -> StoreResult<PathBuf> {
        #[allow(clippy::disallowed_methods)]
        let home = std::env::var("HOME").map_err(|_| StoreError::InvalidPath("HOME not set".to_string()))?;
        Ok(Path::new(&home).join(".caresphere").join("session.json"))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn ensure_dir(&self) -> StoreResult<()> {
        let dir = self
            .file_path
            .parent()
            .ok_or_else(|| StoreError::InvalidPath(self.file_path.display().to_string()))?;

        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
            }
        }

        Ok(())
    }

    fn atomic_write(&self, content: &str) -> StoreResult<()> {
        let file_name = self
            .file_path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| StoreError::InvalidPath(self.file_path.display().to_string()))?;
        let temp_path = self.file_path.with_file_name(format!(".{}.tmp.{}", file_name, Uuid::new_v4()));

        if let Err(e) = fs::write(&temp_path, content) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600)) {
                let _ = fs::remove_file(&temp_path);
                return Err(e.into());
            }
        }

        fs::rename(&temp_path, &self.file_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StoreError::Io(e)
        })
    }
}

impl SlotStore for FileSlots {
    fn load(&self) -> StoreResult<Slots> {
        if !self.file_path.exists() {
            return Ok(Slots::new());
        }

        let contents = fs::read_to_string(&self.file_path)?;
        let file: SessionFile = serde_json::from_str(&contents)?;
        Ok(file.slots)
    }

    fn replace(&self, slots: Slots) -> StoreResult<()> {
        self.ensure_dir()?;

        let file = SessionFile {
            version: SESSION_FILE_VERSION.to_string(),
            slots,
            updated_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        self.atomic_write(&json)
    }
}
