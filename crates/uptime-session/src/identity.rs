//! Identity provider seam.
//!
//! The synchronizer never talks to the identity provider SDK directly; it
//! consumes read-only [`IdentitySnapshot`] values describing the provider's
//! current state and calls back through the [`IdentityGateway`] trait for
//! token acquisition and interactive redirects.

use async_trait::async_trait;
use uptime_core::AccountId;

use crate::error::IdentityError;

/// Whether the identity provider currently has an interactive flow
/// (login, consent, MFA) in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    None,
    InProgress,
}

/// Read-only view of the identity provider's state at one point in time.
///
/// Snapshot changes are the only events that drive the synchronizer. A
/// snapshot is a value, not a live handle: reconciliation decisions are made
/// against the snapshot that triggered the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySnapshot {
    /// True when the provider reports an authenticated user.
    pub is_authenticated: bool,
    /// The active identity-provider account, when one is present.
    pub account_id: Option<AccountId>,
    /// Interactive-flow status of the provider.
    pub interaction: InteractionState,
}

impl IdentitySnapshot {
    /// Snapshot for an authenticated account with no interaction in flight.
    #[must_use]
    pub fn authenticated(account: impl Into<AccountId>) -> Self {
        Self {
            is_authenticated: true,
            account_id: Some(account.into()),
            interaction: InteractionState::None,
        }
    }

    /// Snapshot for a logged-out provider.
    #[must_use]
    pub fn logged_out() -> Self {
        Self {
            is_authenticated: false,
            account_id: None,
            interaction: InteractionState::None,
        }
    }

    /// True when this snapshot allows a reconciliation pass to proceed past
    /// the logged-out check: authenticated, interaction settled, and at
    /// least one account present.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.is_authenticated
            && self.interaction == InteractionState::None
            && self.account_id.is_some()
    }
}

/// Opaque identity token issued by the provider, exchanged for a backend
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Callbacks into the identity provider.
///
/// Implementations wrap the provider SDK. All methods are invoked from the
/// synchronizer's event loop; interactive redirects typically unload the
/// application, so implementations may never return in a browser context.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Acquire an identity token silently.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::InteractionRequired`] when the provider needs an
    ///   interactive flow; the synchronizer responds with `login_redirect`.
    /// - [`IdentityError::Acquisition`] for any other failure.
    async fn acquire_token(&self) -> Result<IdentityToken, IdentityError>;

    /// Start the provider's interactive login redirect.
    async fn login_redirect(&self) -> Result<(), IdentityError>;

    /// Start the provider's interactive logout redirect.
    async fn logout_redirect(&self) -> Result<(), IdentityError>;

    /// Hard navigation fallback used when the logout redirect itself fails.
    /// Must not fail; a plain location change is always possible.
    fn hard_redirect(&self, location: &str);
}
