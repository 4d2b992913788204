//! Reference metadata (lookup tables) fetched after a session is ready.
//!
//! The fetch is best-effort: failure is logged and never affects session
//! validity.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uptime_core::UptimeError;

/// One entry of a backend lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntry {
    pub id: i64,
    pub name: String,
}

/// Reference lookup tables served by `GET /api/v1/system/meta-data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetadata {
    #[serde(default)]
    pub ticket_statuses: Vec<LookupEntry>,
    #[serde(default)]
    pub ticket_priorities: Vec<LookupEntry>,
    #[serde(default)]
    pub ticket_categories: Vec<LookupEntry>,
}

/// Observable cache for the most recently fetched [`SystemMetadata`].
#[derive(Debug, Clone)]
pub struct MetadataCache {
    tx: Arc<watch::Sender<Option<SystemMetadata>>>,
}

impl MetadataCache {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Most recently stored metadata, if any fetch has succeeded.
    #[must_use]
    pub fn get(&self) -> Option<SystemMetadata> {
        self.tx.borrow().clone()
    }

    /// Replace the cached metadata.
    pub fn store(&self, metadata: SystemMetadata) {
        self.tx.send_replace(Some(metadata));
    }

    /// Drop the cached metadata.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Subscribe to metadata updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<SystemMetadata>> {
        self.tx.subscribe()
    }

    /// Cached metadata, or `UptimeError::NotFound` when no fetch has
    /// succeeded yet.
    pub fn require(&self) -> uptime_core::Result<SystemMetadata> {
        self.get().ok_or_else(|| UptimeError::NotFound {
            resource: "SystemMetadata".to_string(),
            id: None,
        })
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
