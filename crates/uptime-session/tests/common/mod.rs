//! Shared fixtures for synchronizer scenario tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::timeout;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use uptime_session::{
    IdentityError, IdentityGateway, IdentityToken, MemoryStore, MetadataCache, Notifier,
    SessionStore, SessionSynchronizer, SyncConfig, SyncHandle, SyncState,
};

pub const SIGN_IN_PATH: &str = "/api/v1/auth/ms-sign-in";
pub const METADATA_PATH: &str = "/api/v1/system/meta-data";
pub const STORAGE_KEY: &str = "uptime.session";

/// How `MockIdentityGateway::acquire_token` behaves.
#[derive(Debug, Clone)]
pub enum TokenBehavior {
    Succeed(String),
    InteractionRequired,
    Fail(String),
}

/// Scriptable identity-provider stub with call accounting.
pub struct MockIdentityGateway {
    behavior: Mutex<TokenBehavior>,
    acquire_delay: Duration,
    logout_fails: Mutex<bool>,
    pub acquire_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub login_redirects: AtomicUsize,
    pub logout_redirects: AtomicUsize,
    pub hard_redirects: Mutex<Vec<String>>,
}

impl MockIdentityGateway {
    pub fn new(behavior: TokenBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            acquire_delay: Duration::ZERO,
            logout_fails: Mutex::new(false),
            acquire_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            login_redirects: AtomicUsize::new(0),
            logout_redirects: AtomicUsize::new(0),
            hard_redirects: Mutex::new(Vec::new()),
        }
    }

    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = delay;
        self
    }

    pub fn with_failing_logout(self) -> Self {
        *self.logout_fails.lock().unwrap() = true;
        self
    }
}

/// Decrements the in-flight gauge even when the acquisition future is
/// dropped by a cancelled pass.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityGateway for MockIdentityGateway {
    async fn acquire_token(&self) -> Result<IdentityToken, IdentityError> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        if !self.acquire_delay.is_zero() {
            tokio::time::sleep(self.acquire_delay).await;
        }

        match self.behavior.lock().unwrap().clone() {
            TokenBehavior::Succeed(raw) => Ok(IdentityToken::new(raw)),
            TokenBehavior::InteractionRequired => Err(IdentityError::InteractionRequired),
            TokenBehavior::Fail(reason) => Err(IdentityError::Acquisition(reason)),
        }
    }

    async fn login_redirect(&self) -> Result<(), IdentityError> {
        self.login_redirects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn logout_redirect(&self) -> Result<(), IdentityError> {
        self.logout_redirects.fetch_add(1, Ordering::SeqCst);
        if *self.logout_fails.lock().unwrap() {
            Err(IdentityError::Redirect("popup blocked".to_string()))
        } else {
            Ok(())
        }
    }

    fn hard_redirect(&self, location: &str) {
        self.hard_redirects.lock().unwrap().push(location.to_string());
    }
}

/// Notifier that records surfaced messages.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// A wired-up synchronizer with handles on all its collaborators.
pub struct TestRig {
    pub handle: SyncHandle,
    pub session_store: SessionStore,
    pub metadata: MetadataCache,
    pub persistence: Arc<MemoryStore>,
    pub gateway: Arc<MockIdentityGateway>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Spawn a synchronizer against `server` with the given gateway.
pub fn spawn_synchronizer(server: &MockServer, gateway: MockIdentityGateway) -> TestRig {
    let config = SyncConfig::new(server.uri()).with_request_timeout(Duration::from_secs(5));
    let session_store = SessionStore::new();
    let metadata = MetadataCache::new();
    let persistence = Arc::new(MemoryStore::new());
    let gateway = Arc::new(gateway);
    let notifier = Arc::new(RecordingNotifier::default());

    let (synchronizer, handle) = SessionSynchronizer::new(
        config,
        gateway.clone(),
        persistence.clone(),
        session_store.clone(),
        metadata.clone(),
        notifier.clone(),
    );
    tokio::spawn(synchronizer.run());

    TestRig {
        handle,
        session_store,
        metadata,
        persistence,
        gateway,
        notifier,
    }
}

/// Wait until the machine reaches `want` (observes the current value too).
pub async fn wait_for_state(handle: &SyncHandle, want: SyncState) {
    let mut rx = handle.subscribe_state();
    timeout(Duration::from_secs(5), rx.wait_for(|state| *state == want))
        .await
        .expect("timed out waiting for sync state")
        .expect("synchronizer dropped its state channel");
}

/// Poll until `check` holds.
pub async fn wait_until(check: impl Fn() -> bool) {
    timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for condition");
}

/// Canonical session payload returned by the mock sign-in endpoint.
pub fn session_body(token: &str, refresh_token: &str) -> serde_json::Value {
    json!({
        "token": token,
        "refreshToken": refresh_token,
        "user": {
            "id": "7f8d9c50-8f64-4d9f-9b7e-2f3a4b5c6d7e",
            "email": "lead@uptime.example",
            "firstName": "Ada",
            "lastName": "Okafor",
            "role": "team-lead",
            "isTeamLead": true
        }
    })
}

/// Mount a successful sign-in endpoint.
pub async fn mount_sign_in_success(server: &MockServer, token: &str, refresh_token: &str) {
    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body(token, refresh_token)))
        .mount(server)
        .await;
}

/// Mount a sign-in endpoint that rejects with `status`.
pub async fn mount_sign_in_rejection(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": "invalid_token",
            "message": "Identity token rejected"
        })))
        .mount(server)
        .await;
}

/// Mount a metadata endpoint with one lookup table.
pub async fn mount_metadata_success(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(METADATA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ticketStatuses": [{"id": 1, "name": "Open"}, {"id": 2, "name": "Closed"}],
            "ticketPriorities": [{"id": 1, "name": "High"}],
            "ticketCategories": []
        })))
        .mount(server)
        .await;
}
