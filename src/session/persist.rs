//! Durable persistence for the session store.
//!
//! [`PersistentStore`] decorates a [`SessionStore`]: every mutating
//! operation commits in memory first, then writes the persisted projection
//! to a [`SlotStorage`] under [`STORAGE_KEY`]. Storage failures are logged
//! and never reach the caller; memory stays the source of truth for the
//! running process.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{PersistedSession, Session, SessionStore, Subscription};

/// Fixed key of the durable slot holding the session projection.
pub const STORAGE_KEY: &str = "auth-storage";

/// A durable key-value slot.
pub trait SlotStorage: Send + Sync {
    /// Read the slot. A slot that was never written reads as `None`.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the slot's contents.
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Slots stored as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store slots under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SlotStorage for FileStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Write a uniquely named file beside the target, then rename over it
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(self.slot_path(key))?;
        Ok(())
    }
}

/// Slots kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with one slot already populated.
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        storage
    }

    /// Current raw contents of a slot.
    pub fn get(&self, key: &str) -> Option<String> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: SlotStorage + ?Sized> SlotStorage for std::sync::Arc<S> {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        (**self).write(key, value)
    }
}

/// Read and parse the persisted projection.
///
/// Any failure yields `None`: an unreadable or malformed slot means the
/// session starts empty.
fn load_persisted<S: SlotStorage>(storage: &S) -> Option<PersistedSession> {
    let raw = match storage.read(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("no persisted session under {STORAGE_KEY}");
            return None;
        }
        Err(e) => {
            warn!("failed to read persisted session: {e}");
            return None;
        }
    };

    match serde_json::from_str::<PersistedSession>(&raw) {
        Ok(persisted) => Some(persisted),
        Err(e) => {
            warn!("ignoring malformed persisted session: {e}");
            None
        }
    }
}

/// [`SessionStore`] whose every mutation is followed by a durable write.
pub struct PersistentStore<S: SlotStorage> {
    inner: SessionStore,
    storage: S,
}

impl<S: SlotStorage> PersistentStore<S> {
    /// Open the store, rehydrating from `storage` when the slot is usable.
    pub fn open(storage: S) -> Self {
        let session = match load_persisted(&storage) {
            Some(persisted) => {
                debug!(
                    authenticated = persisted.is_authenticated,
                    "rehydrated persisted session"
                );
                Session::rehydrate(persisted)
            }
            None => Session::default(),
        };

        Self {
            inner: SessionStore::with_session(session),
            storage,
        }
    }

    pub fn login(&self, user: Value, token: impl Into<String>) -> Session {
        let token = token.into();
        self.commit(move |s| s.login(user, token))
    }

    pub fn logout(&self) -> Session {
        self.commit(Session::logout)
    }

    pub fn set_loading(&self, loading: bool) -> Session {
        self.commit(|s| s.set_loading(loading))
    }

    pub fn set_error(&self, message: impl Into<String>) -> Session {
        let message = message.into();
        self.commit(move |s| s.set_error(message))
    }

    pub fn clear_error(&self) -> Session {
        self.commit(Session::clear_error)
    }

    pub fn snapshot(&self) -> Session {
        self.inner.snapshot()
    }

    pub fn subscribe<F>(&self, listener: F) -> (Session, Subscription)
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        self.inner.subscribe(listener)
    }

    /// The backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply a change and write its projection before the next change can
    /// commit, so the slot always ends on the latest session.
    fn commit<F>(&self, change: F) -> Session
    where
        F: FnOnce(&mut Session),
    {
        self.inner.apply_then(change, |committed| self.persist(committed))
    }

    /// Write the projection of a committed session. Failures are logged only.
    fn persist(&self, committed: &Session) {
        let result = serde_json::to_string(&committed.persisted())
            .map_err(io::Error::from)
            .and_then(|json| self.storage.write(STORAGE_KEY, &json));

        if let Err(e) = result {
            warn!("failed to persist session: {e}");
        }
    }
}

impl<S: SlotStorage> std::fmt::Debug for PersistentStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
