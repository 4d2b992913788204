//! Session synchronization for the Uptime support-ticket platform.
//!
//! This crate keeps a backend-issued session consistent with the state of an
//! external identity provider. It observes identity snapshots (authenticated,
//! logged out, interaction in progress), exchanges an identity token for a
//! backend session exactly once per identity-provider login, persists the
//! resulting session record, and tears everything down again when the
//! provider reports logged-out.
//!
//! The synchronizer is an explicit, re-entrant state machine
//! ([`SyncState`]) driven by snapshot change events. Each snapshot change
//! starts a reconciliation pass; a new pass always cancels outstanding work
//! from the prior pass, and late results of a superseded pass are discarded.
//!
//! External collaborators are modeled as seams:
//!
//! - [`IdentityGateway`] - silent token acquisition and interactive
//!   login/logout redirects of the identity provider
//! - [`PersistenceStore`] - synchronous key-value storage for the persisted
//!   session record
//! - [`SessionStore`] - the application-wide observable session container
//! - [`Notifier`] - user-visible error notifications
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uptime_session::{
//!     IdentitySnapshot, MemoryStore, MetadataCache, SessionStore,
//!     SessionSynchronizer, SyncConfig,
//! };
//!
//! let config = SyncConfig::new("https://api.uptime.example");
//! let session_store = SessionStore::new();
//! let metadata = MetadataCache::new();
//! let (synchronizer, handle) = SessionSynchronizer::new(
//!     config,
//!     gateway,
//!     Arc::new(MemoryStore::new()),
//!     session_store.clone(),
//!     metadata.clone(),
//!     notifier,
//! );
//! tokio::spawn(synchronizer.run());
//! handle.observe(IdentitySnapshot::authenticated("home-account-1"));
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod metadata;
pub mod notify;
pub mod session;
pub mod store;
pub mod sync;

pub use api::ApiClient;
pub use config::{ConfigError, SyncConfig};
pub use error::{IdentityError, SessionSyncError};
pub use identity::{IdentityGateway, IdentitySnapshot, IdentityToken, InteractionState};
pub use metadata::{LookupEntry, MetadataCache, SystemMetadata};
pub use notify::{LogNotifier, Notifier};
pub use session::{SessionRecord, UserProfile};
pub use store::{MemoryStore, PersistenceStore, SessionStore};
pub use sync::{SessionSynchronizer, SyncHandle, SyncState};
