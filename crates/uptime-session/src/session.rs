//! Session and user profile wire models.

use serde::{Deserialize, Serialize};
use uptime_core::UserId;

/// Profile of the authenticated user, as returned by the token exchange.
///
/// Immutable after creation; only a fresh token exchange replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Role name assigned by the backend (e.g. "agent", "team-lead").
    pub role: String,
    #[serde(default)]
    pub is_team_lead: bool,
}

impl UserProfile {
    /// Display name in "First Last" form.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Backend-issued session, as returned by the token exchange and as persisted
/// between reloads.
///
/// At most one record exists at a time. Its presence in the persistence
/// store and the application session store is kept consistent: the
/// synchronizer always sets or clears both in the same reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

impl SessionRecord {
    /// True when the record carries a usable session token. Persisted
    /// records with an empty token are treated as absent.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}
