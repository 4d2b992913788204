//! The session-synchronization state machine.
//!
//! Reconciles identity-provider state with the backend-issued session. The
//! machine is re-entrant: every [`IdentitySnapshot`] change starts a
//! reconciliation pass, and a new pass always cancels outstanding work from
//! the prior pass before it begins. Late results of a superseded pass are
//! discarded, so a stale token-exchange response can never overwrite newer
//! session state.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::config::SyncConfig;
use crate::error::IdentityError;
use crate::identity::{IdentityGateway, IdentitySnapshot};
use crate::metadata::MetadataCache;
use crate::notify::Notifier;
use crate::session::SessionRecord;
use crate::store::{PersistenceStore, SessionStore};

/// Notification shown when the backend rejects the token exchange.
const EXCHANGE_REJECTED_MESSAGE: &str = "Sign-in failed. Please try again.";

/// State of the session synchronizer.
///
/// Initial state is `Unauthenticated`; there is no terminal state. The
/// machine is re-evaluated on every identity-snapshot change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No backend session; also the landing state after any forced logout.
    #[default]
    Unauthenticated,
    /// Provider is authenticated; looking for a persisted session record.
    SyncingFromCache,
    /// No usable persisted record; exchanging an identity token with the
    /// backend.
    ExchangingToken,
    /// A backend session is applied to the session store.
    Ready,
    /// Token exchange or token acquisition failed; forced logout underway.
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Unauthenticated => write!(f, "unauthenticated"),
            SyncState::SyncingFromCache => write!(f, "syncing-from-cache"),
            SyncState::ExchangingToken => write!(f, "exchanging-token"),
            SyncState::Ready => write!(f, "ready"),
            SyncState::Failed => write!(f, "failed"),
        }
    }
}

/// Handle for feeding snapshots to a running synchronizer and observing its
/// state.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    snapshot_tx: mpsc::UnboundedSender<IdentitySnapshot>,
    state_rx: watch::Receiver<SyncState>,
}

impl SyncHandle {
    /// Enqueue an identity-snapshot change. Non-blocking; snapshots are
    /// processed one at a time by the event loop. Ignored when the loop has
    /// stopped.
    pub fn observe(&self, snapshot: IdentitySnapshot) {
        if self.snapshot_tx.send(snapshot).is_err() {
            debug!("Snapshot dropped: synchronizer event loop has stopped");
        }
    }

    /// Current machine state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        *self.state_rx.borrow()
    }

    /// Subscribe to machine-state changes.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state_rx.clone()
    }
}

/// Everything one reconciliation pass needs; cheap to clone into the pass
/// task.
#[derive(Clone)]
struct SyncContext {
    config: Arc<SyncConfig>,
    gateway: Arc<dyn IdentityGateway>,
    persistence: Arc<dyn PersistenceStore>,
    session_store: SessionStore,
    metadata: MetadataCache,
    notifier: Arc<dyn Notifier>,
    api: ApiClient,
    state_tx: Arc<watch::Sender<SyncState>>,
}

/// The session synchronizer event loop.
///
/// Construct with [`SessionSynchronizer::new`], then spawn
/// [`SessionSynchronizer::run`] and drive it through the returned
/// [`SyncHandle`]. The loop exits when every handle has been dropped.
pub struct SessionSynchronizer {
    ctx: SyncContext,
    snapshot_rx: mpsc::UnboundedReceiver<IdentitySnapshot>,
}

impl SessionSynchronizer {
    /// Wire up a synchronizer with its collaborators.
    ///
    /// `session_store` and `metadata` are shared containers; keep clones to
    /// read session state and lookup tables from the rest of the
    /// application.
    #[must_use]
    pub fn new(
        config: SyncConfig,
        gateway: Arc<dyn IdentityGateway>,
        persistence: Arc<dyn PersistenceStore>,
        session_store: SessionStore,
        metadata: MetadataCache,
        notifier: Arc<dyn Notifier>,
    ) -> (Self, SyncHandle) {
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SyncState::Unauthenticated);
        let api = ApiClient::new(&config);

        let synchronizer = Self {
            ctx: SyncContext {
                config: Arc::new(config),
                gateway,
                persistence,
                session_store,
                metadata,
                notifier,
                api,
                state_tx: Arc::new(state_tx),
            },
            snapshot_rx,
        };
        let handle = SyncHandle {
            snapshot_tx,
            state_rx,
        };
        (synchronizer, handle)
    }

    /// Run the event loop.
    ///
    /// Consumes snapshot events one at a time. Each event cancels any
    /// in-flight pass from the previous snapshot, waits for it to wind
    /// down, then starts a fresh pass. No two passes ever run concurrently,
    /// which also guarantees at most one token exchange in flight.
    pub async fn run(mut self) {
        info!("Session synchronizer started");
        let mut in_flight: Option<(CancellationToken, JoinHandle<()>)> = None;

        while let Some(snapshot) = self.snapshot_rx.recv().await {
            if let Some((pass, task)) = in_flight.take() {
                pass.cancel();
                let _ = task.await;
            }

            let pass = CancellationToken::new();
            let pass_token = pass.clone();
            let ctx = self.ctx.clone();
            let task = tokio::spawn(async move {
                tokio::select! {
                    () = pass_token.cancelled() => {
                        debug!("Reconciliation pass superseded before completion");
                    }
                    () = ctx.reconcile(snapshot, &pass_token) => {}
                }
            });
            in_flight = Some((pass, task));
        }

        if let Some((pass, task)) = in_flight.take() {
            pass.cancel();
            let _ = task.await;
        }
        info!("Session synchronizer stopped");
    }
}

impl SyncContext {
    /// One reconciliation pass for `snapshot`.
    async fn reconcile(&self, snapshot: IdentitySnapshot, pass: &CancellationToken) {
        if !snapshot.is_authenticated {
            // Provider reports logged-out: clear both stores unconditionally,
            // regardless of prior state.
            self.clear_local_session();
            self.set_state(SyncState::Unauthenticated);
            return;
        }

        if !snapshot.is_settled() {
            // Two distinct defer causes: an interactive flow mid-redirect, or
            // an authenticated report with no account resolved yet.
            debug!(
                interaction = ?snapshot.interaction,
                has_account = snapshot.account_id.is_some(),
                "Identity snapshot not settled, deferring reconciliation"
            );
            return;
        }

        self.set_state(SyncState::SyncingFromCache);
        if let Some(record) = self.load_persisted() {
            debug!(user_id = %record.user.id, "Re-applying persisted session, no exchange needed");
            self.session_store.set(record.clone());
            self.set_state(SyncState::Ready);
            self.refresh_metadata(&record).await;
            return;
        }

        self.set_state(SyncState::ExchangingToken);
        let identity_token = match self.gateway.acquire_token().await {
            Ok(token) => token,
            Err(IdentityError::InteractionRequired) => {
                info!("Silent token acquisition needs interaction, starting login redirect");
                if let Err(e) = self.gateway.login_redirect().await {
                    warn!(error = %e, "Login redirect failed");
                }
                return;
            }
            Err(e) => {
                warn!(error = %e, "Identity token acquisition failed");
                self.fail_and_logout(None).await;
                return;
            }
        };

        if pass.is_cancelled() {
            return;
        }

        match self.api.exchange_identity_token(&identity_token).await {
            Ok(record) => {
                if pass.is_cancelled() {
                    debug!("Discarding token-exchange result from superseded pass");
                    return;
                }
                self.persist(&record);
                self.session_store.set(record.clone());
                self.set_state(SyncState::Ready);
                info!(
                    user_id = %record.user.id,
                    role = %record.user.role,
                    "Session established via token exchange"
                );
                self.refresh_metadata(&record).await;
            }
            Err(e) => {
                error!(error = %e, "Token exchange failed");
                let message = e
                    .is_exchange_rejection()
                    .then_some(EXCHANGE_REJECTED_MESSAGE);
                self.fail_and_logout(message).await;
            }
        }
    }

    /// Enter `Failed`, optionally surface a notification, force a full
    /// logout, and land in `Unauthenticated`. Partial states are never left
    /// behind.
    async fn fail_and_logout(&self, notification: Option<&str>) {
        self.set_state(SyncState::Failed);
        if let Some(message) = notification {
            self.notifier.error(message);
        }
        self.force_logout().await;
        self.set_state(SyncState::Unauthenticated);
    }

    /// Clear local state, then ask the provider for a logout redirect. If
    /// the redirect fails, fall back to a hard navigation so the user is
    /// never left half-authenticated.
    async fn force_logout(&self) {
        self.clear_local_session();
        if let Err(e) = self.gateway.logout_redirect().await {
            warn!(error = %e, "Logout redirect failed, falling back to hard navigation");
            self.gateway.hard_redirect(&self.config.post_logout_path);
        }
    }

    /// Clear the persisted record and the session store together.
    fn clear_local_session(&self) {
        self.persistence.remove(&self.config.storage_key);
        self.session_store.clear();
    }

    /// Load the persisted session record, discarding records with an empty
    /// token or an unreadable payload.
    fn load_persisted(&self) -> Option<SessionRecord> {
        let raw = self.persistence.get(&self.config.storage_key)?;
        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) if record.has_token() => Some(record),
            Ok(_) => {
                debug!("Persisted session has an empty token, ignoring");
                None
            }
            Err(e) => {
                warn!(error = %e, "Persisted session is unreadable, discarding");
                self.persistence.remove(&self.config.storage_key);
                None
            }
        }
    }

    /// Write the session record to the persistence store.
    fn persist(&self, record: &SessionRecord) {
        match serde_json::to_string(record) {
            Ok(raw) => self.persistence.set(&self.config.storage_key, &raw),
            Err(e) => {
                // The session store still gets the record; only the
                // cached copy for the next reload is lost.
                error!(error = %e, "Failed to serialize session record for persistence");
            }
        }
    }

    /// Best-effort fetch of the reference lookup tables. Failure is logged
    /// and does not affect the `Ready` state.
    async fn refresh_metadata(&self, record: &SessionRecord) {
        match self.api.fetch_metadata(&record.token).await {
            Ok(metadata) => {
                debug!("Reference metadata refreshed");
                self.metadata.store(metadata);
            }
            Err(e) => {
                warn!(error = %e, "Metadata fetch failed, session stays ready");
            }
        }
    }

    fn set_state(&self, next: SyncState) {
        let previous = self.state_tx.send_replace(next);
        if previous != next {
            info!(from = %previous, to = %next, "Sync state transition");
        }
    }
}
