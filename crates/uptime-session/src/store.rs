//! Session state containers.
//!
//! Two stores back the synchronizer: a synchronous key-value
//! [`PersistenceStore`] that survives application reloads, and the in-process
//! observable [`SessionStore`] that the rest of the application reads. The
//! synchronizer is the single writer of both.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use uptime_core::UptimeError;

use crate::session::SessionRecord;

/// Synchronous key-value storage for the persisted session record.
///
/// Mirrors browser local storage semantics: string keyed, string valued,
/// no I/O suspension points. Implementations must tolerate concurrent
/// readers; the synchronizer is the only writer.
pub trait PersistenceStore: Send + Sync {
    /// Read the value under `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove the value under `key`. Removing a missing key is a no-op.
    fn remove(&self, key: &str);
}

/// In-memory [`PersistenceStore`] for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("persistence store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("persistence store lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .expect("persistence store lock poisoned")
            .remove(key);
    }
}

/// Application-wide observable session container.
///
/// An explicit, injectable replacement for a global mutable session store:
/// pass clones of one instance to the synchronizer and to readers. Readers
/// observe changes through [`SessionStore::subscribe`]; mutation is limited
/// to the synchronizer and the logout path.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<SessionRecord>>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Current session record, if an authenticated session exists.
    #[must_use]
    pub fn get(&self) -> Option<SessionRecord> {
        self.tx.borrow().clone()
    }

    /// Apply an authenticated session.
    pub fn set(&self, record: SessionRecord) {
        self.tx.send_replace(Some(record));
    }

    /// Clear the session.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Subscribe to session changes. The receiver observes the current
    /// value immediately and every subsequent set/clear.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionRecord>> {
        self.tx.subscribe()
    }

    /// Bearer token for authorizing backend requests.
    ///
    /// # Errors
    ///
    /// `UptimeError::Unauthorized` when no session is present.
    pub fn bearer_token(&self) -> uptime_core::Result<String> {
        self.get()
            .filter(SessionRecord::has_token)
            .map(|record| record.token)
            .ok_or_else(UptimeError::unauthorized)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
