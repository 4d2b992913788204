//! Headless demonstration of the session synchronizer.
//!
//! Seeds the persistence store with a session record and drives the machine
//! through the cache path, so no backend is needed. The best-effort metadata
//! fetch fails against the placeholder URL and is logged without affecting
//! the `Ready` state.
//!
//! Run with: `cargo run --example headless_sync`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uptime_session::{
    IdentityError, IdentityGateway, IdentitySnapshot, IdentityToken, LogNotifier, MemoryStore,
    MetadataCache, PersistenceStore, SessionStore, SessionSynchronizer, SyncConfig, SyncState,
};

/// Identity provider stub that always has a signed-in account.
struct StubGateway;

#[async_trait]
impl IdentityGateway for StubGateway {
    async fn acquire_token(&self) -> Result<IdentityToken, IdentityError> {
        Ok(IdentityToken::new("stub-identity-token"))
    }

    async fn login_redirect(&self) -> Result<(), IdentityError> {
        println!("(would redirect to the identity provider's login page)");
        Ok(())
    }

    async fn logout_redirect(&self) -> Result<(), IdentityError> {
        println!("(would redirect to the identity provider's logout page)");
        Ok(())
    }

    fn hard_redirect(&self, location: &str) {
        println!("(would hard-navigate to {location})");
    }
}

const SEEDED_SESSION: &str = r#"{
    "token": "demo-session-token",
    "refreshToken": "demo-refresh-token",
    "user": {
        "id": "7f8d9c50-8f64-4d9f-9b7e-2f3a4b5c6d7e",
        "email": "lead@uptime.example",
        "firstName": "Ada",
        "lastName": "Okafor",
        "role": "team-lead",
        "isTeamLead": true
    }
}"#;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uptime_session=debug".into()),
        )
        .init();

    let config = SyncConfig::new("http://127.0.0.1:9")
        .with_request_timeout(Duration::from_millis(250));
    let session_store = SessionStore::new();
    let persistence = Arc::new(MemoryStore::new());
    persistence.set(&config.storage_key, SEEDED_SESSION);

    let (synchronizer, handle) = SessionSynchronizer::new(
        config,
        Arc::new(StubGateway),
        persistence,
        session_store.clone(),
        MetadataCache::new(),
        Arc::new(LogNotifier),
    );
    tokio::spawn(synchronizer.run());

    handle.observe(IdentitySnapshot::authenticated("demo-account"));

    let mut states = handle.subscribe_state();
    states
        .wait_for(|state| *state == SyncState::Ready)
        .await
        .expect("synchronizer stopped unexpectedly");

    let record = session_store.get().expect("session applied");
    println!(
        "ready: {} <{}> role={}",
        record.user.display_name(),
        record.user.email,
        record.user.role
    );
}
