//! Session synchronization error types.

use thiserror::Error;

/// Errors raised by the identity provider seam.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// Silent token acquisition needs user interaction (consent, MFA,
    /// expired refresh). Resolved by delegating to the provider's own
    /// interactive login redirect.
    #[error("Identity provider requires interaction")]
    InteractionRequired,

    /// Silent token acquisition failed for a non-interactive reason.
    #[error("Identity token acquisition failed: {0}")]
    Acquisition(String),

    /// An interactive redirect (login or logout) could not be started.
    #[error("Identity redirect failed: {0}")]
    Redirect(String),
}

/// Errors raised during a reconciliation pass.
#[derive(Debug, Error)]
pub enum SessionSyncError {
    /// The backend rejected the identity token during exchange.
    #[error("Token exchange rejected by backend: HTTP {status}")]
    ExchangeRejected { status: u16 },

    /// The reference-metadata fetch was rejected.
    #[error("Metadata fetch rejected by backend: HTTP {status}")]
    MetadataRejected { status: u16 },

    /// Transport-level HTTP failure (connect, timeout, malformed body).
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The persisted session record could not be serialized.
    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Identity provider failure surfaced into the pass.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl SessionSyncError {
    /// True when the backend explicitly rejected the token exchange, as
    /// opposed to a transport failure.
    #[must_use]
    pub fn is_exchange_rejection(&self) -> bool {
        matches!(self, SessionSyncError::ExchangeRejected { .. })
    }
}
