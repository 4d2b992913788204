//! HTTP client for the two backend endpoints the synchronizer consumes.

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::SyncConfig;
use crate::error::SessionSyncError;
use crate::identity::IdentityToken;
use crate::metadata::SystemMetadata;
use crate::session::SessionRecord;

/// Token-exchange request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    id_token: &'a str,
}

/// Client for the Uptime backend auth and metadata endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: Client,
}

impl ApiClient {
    /// Build a client from the synchronizer configuration.
    #[must_use]
    pub fn new(config: &SyncConfig) -> Self {
        // Builder failure only occurs when the TLS backend cannot be
        // initialized; fall back to the default client in that case.
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: config.api_base_url.clone(),
            http_client,
        }
    }

    fn sign_in_endpoint(&self) -> String {
        format!("{}/api/v1/auth/ms-sign-in", self.base_url)
    }

    fn metadata_endpoint(&self) -> String {
        format!("{}/api/v1/system/meta-data", self.base_url)
    }

    /// Exchange an identity token for a backend session.
    ///
    /// Public endpoint: no prior session is required.
    ///
    /// # Errors
    ///
    /// - `SessionSyncError::ExchangeRejected` when the backend responds with
    ///   a non-success status.
    /// - `SessionSyncError::Http` for transport failures or a malformed body.
    pub async fn exchange_identity_token(
        &self,
        identity_token: &IdentityToken,
    ) -> Result<SessionRecord, SessionSyncError> {
        let response = self
            .http_client
            .post(self.sign_in_endpoint())
            .json(&SignInRequest {
                id_token: identity_token.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionSyncError::ExchangeRejected {
                status: status.as_u16(),
            });
        }

        let record: SessionRecord = response.json().await?;
        debug!(user_id = %record.user.id, "Token exchange succeeded");
        Ok(record)
    }

    /// Fetch the reference lookup tables.
    ///
    /// Requires an authenticated session token.
    ///
    /// # Errors
    ///
    /// - `SessionSyncError::MetadataRejected` when the backend responds with
    ///   a non-success status.
    /// - `SessionSyncError::Http` for transport failures or a malformed body.
    pub async fn fetch_metadata(
        &self,
        session_token: &str,
    ) -> Result<SystemMetadata, SessionSyncError> {
        let response = self
            .http_client
            .get(self.metadata_endpoint())
            .bearer_auth(session_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionSyncError::MetadataRejected {
                status: status.as_u16(),
            });
        }

        let metadata: SystemMetadata = response.json().await?;
        Ok(metadata)
    }
}
