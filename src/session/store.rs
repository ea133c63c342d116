//! Durable session identity
//!
//! The session id survives restarts through a [`SessionStorage`] backend and
//! is mirrored into the addressable [`PageLocation`] so a link can carry it.
//! Storage failures are never surfaced to callers; they read as "no id".

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::identifiers::SessionId;
use crate::types::options::ClientOptions;

/// Query parameter that carries the session id
pub const SESSION_QUERY_KEY: &str = "session";

/// File name of the stored session record
pub const SESSION_FILE_NAME: &str = "session.json";

// ============================================================================
// Page location
// ============================================================================

/// Addressable location of the client, e.g. `https://host/crun?session=abc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation(Url);

impl PageLocation {
    /// Wrap a URL
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self(url)
    }

    /// Underlying URL
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.0
    }

    /// Session id carried in the query, if any
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.0
            .query_pairs()
            .find(|(key, _)| key == SESSION_QUERY_KEY)
            .map(|(_, value)| SessionId::new(value.into_owned()))
            .filter(|id| !id.is_blank())
    }

    /// Point the location at `id`, keeping every other query pair
    pub fn set_session_id(&mut self, id: &SessionId) {
        let others: Vec<(String, String)> = self
            .0
            .query_pairs()
            .filter(|(key, _)| key != SESSION_QUERY_KEY)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut pairs = self.0.query_pairs_mut();
        pairs.clear();
        for (key, value) in &others {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(SESSION_QUERY_KEY, id.as_str());
    }
}

impl std::fmt::Display for PageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Storage backends
// ============================================================================

/// Key-value slot holding at most one session id
pub trait SessionStorage: Send + Sync {
    /// Previously stored id, if any
    fn load(&self) -> Option<SessionId>;

    /// Replace the stored id
    fn save(&self, id: &SessionId);
}

impl<S: SessionStorage + ?Sized> SessionStorage for Arc<S> {
    fn load(&self) -> Option<SessionId> {
        (**self).load()
    }

    fn save(&self, id: &SessionId) {
        (**self).save(id);
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    session_id: SessionId,
    saved_at: DateTime<Utc>,
}

/// JSON file under a state directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Store the record as `session.json` inside `dir`
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_FILE_NAME),
        }
    }

    /// Path of the record file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Option<SessionId> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", self.path.display());
                return None;
            }
        };

        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(record) if !record.session_id.is_blank() => {
                log::debug!(
                    "Loaded session {} saved at {}",
                    record.session_id,
                    record.saved_at.to_rfc3339()
                );
                Some(record.session_id)
            }
            Ok(_) => None,
            Err(e) => {
                log::warn!("Ignoring malformed session record {}: {e}", self.path.display());
                None
            }
        }
    }

    fn save(&self, id: &SessionId) {
        let record = StoredSession {
            session_id: id.clone(),
            saved_at: Utc::now(),
        };

        let json = match serde_json::to_string_pretty(&record) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to encode session record: {e}");
                return;
            }
        };

        if let Some(parent) = self.path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            log::warn!("Failed to create {}: {e}", parent.display());
            return;
        }

        if let Err(e) = std::fs::write(&self.path, json) {
            log::warn!("Failed to write {}: {e}", self.path.display());
        }
    }
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<SessionId>>,
}

impl MemoryStorage {
    /// Empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage already holding `id`
    #[must_use]
    pub fn with_session(id: SessionId) -> Self {
        Self {
            slot: Mutex::new(Some(id)),
        }
    }

    /// Currently stored id
    #[must_use]
    pub fn current(&self) -> Option<SessionId> {
        self.slot.lock().clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Option<SessionId> {
        self.current()
    }

    fn save(&self, id: &SessionId) {
        *self.slot.lock() = Some(id.clone());
    }
}

// ============================================================================
// Session store
// ============================================================================

/// Resolves and persists the session id
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    /// Create a store over any storage backend
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// File-backed store under the configured state directory
    #[must_use]
    pub fn from_options(options: &ClientOptions) -> Self {
        Self::new(FileStorage::new(&options.state_dir))
    }

    /// Id to present at connect time
    ///
    /// An id in the location wins and is persisted right away; otherwise the
    /// stored id is returned.
    pub fn load(&self, location: &PageLocation) -> Option<SessionId> {
        if let Some(id) = location.session_id() {
            log::debug!("Using session {id} from location");
            self.storage.save(&id);
            return Some(id);
        }
        self.storage.load()
    }

    /// Persist `id`
    pub fn save(&self, id: &SessionId) {
        self.storage.save(id);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
