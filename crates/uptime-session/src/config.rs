//! Synchronizer configuration.
//!
//! Supports both direct construction for embedding and fail-fast loading
//! from environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Storage key under which the session record is persisted.
pub const DEFAULT_STORAGE_KEY: &str = "uptime.session";

/// Location used by the hard-navigation fallback after a failed logout
/// redirect.
pub const DEFAULT_POST_LOGOUT_PATH: &str = "/login";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration loading errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {message}")]
    InvalidVar { var: &'static str, message: String },
}

/// Settings for the session synchronizer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the Uptime backend, without trailing slash.
    pub api_base_url: String,
    /// Persistence-store key for the session record.
    pub storage_key: String,
    /// Hard-navigation fallback target after a failed logout redirect.
    pub post_logout_path: String,
    /// Timeout applied to token-exchange and metadata requests.
    pub request_timeout: Duration,
}

impl SyncConfig {
    /// Create a configuration with defaults for everything but the backend
    /// base URL.
    #[must_use]
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let mut api_base_url = api_base_url.into();
        while api_base_url.ends_with('/') {
            api_base_url.pop();
        }
        Self {
            api_base_url,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            post_logout_path: DEFAULT_POST_LOGOUT_PATH.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Override the persistence-store key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Override the post-logout fallback location.
    #[must_use]
    pub fn with_post_logout_path(mut self, path: impl Into<String>) -> Self {
        self.post_logout_path = path.into();
        self
    }

    /// Override the request timeout (default: 30 seconds).
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// `UPTIME_API_BASE_URL` is required; `UPTIME_SESSION_STORAGE_KEY`,
    /// `UPTIME_POST_LOGOUT_PATH` and `UPTIME_REQUEST_TIMEOUT_SECS` are
    /// optional.
    ///
    /// # Errors
    ///
    /// `ConfigError` when a required variable is missing or a value fails
    /// to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = env::var("UPTIME_API_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("UPTIME_API_BASE_URL"))?;

        let mut config = Self::new(api_base_url);

        if let Ok(key) = env::var("UPTIME_SESSION_STORAGE_KEY") {
            config.storage_key = key;
        }
        if let Ok(path) = env::var("UPTIME_POST_LOGOUT_PATH") {
            config.post_logout_path = path;
        }
        if let Ok(raw) = env::var("UPTIME_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidVar {
                var: "UPTIME_REQUEST_TIMEOUT_SECS",
                message: format!("expected a number of seconds, got '{raw}'"),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::new("https://api.uptime.example");
        assert_eq!(config.api_base_url, "https://api.uptime.example");
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.post_logout_path, DEFAULT_POST_LOGOUT_PATH);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = SyncConfig::new("https://api.uptime.example/");
        assert_eq!(config.api_base_url, "https://api.uptime.example");
    }

    #[test]
    fn test_builder_overrides() {
        let config = SyncConfig::new("https://api.uptime.example")
            .with_storage_key("test.session")
            .with_post_logout_path("/goodbye")
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.storage_key, "test.session");
        assert_eq!(config.post_logout_path, "/goodbye");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::MissingVar("UPTIME_API_BASE_URL").to_string(),
            "Missing required environment variable: UPTIME_API_BASE_URL"
        );
    }

    // All env-var-dependent scenarios are consolidated into a single test
    // to avoid race conditions when Rust runs tests in parallel.
    #[test]
    fn test_from_env() {
        // Scenario 1: required variable missing
        env::remove_var("UPTIME_API_BASE_URL");
        env::remove_var("UPTIME_SESSION_STORAGE_KEY");
        env::remove_var("UPTIME_POST_LOGOUT_PATH");
        env::remove_var("UPTIME_REQUEST_TIMEOUT_SECS");
        assert_eq!(
            SyncConfig::from_env().unwrap_err(),
            ConfigError::MissingVar("UPTIME_API_BASE_URL")
        );

        // Scenario 2: defaults when only the base URL is set
        env::set_var("UPTIME_API_BASE_URL", "https://api.uptime.example/");
        let config = SyncConfig::from_env().expect("base URL alone should suffice");
        assert_eq!(config.api_base_url, "https://api.uptime.example");
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.post_logout_path, DEFAULT_POST_LOGOUT_PATH);
        assert_eq!(config.request_timeout, Duration::from_secs(30));

        // Scenario 3: optional overrides
        env::set_var("UPTIME_SESSION_STORAGE_KEY", "env.session");
        env::set_var("UPTIME_POST_LOGOUT_PATH", "/signed-out");
        env::set_var("UPTIME_REQUEST_TIMEOUT_SECS", "5");
        let config = SyncConfig::from_env().expect("overrides should load");
        assert_eq!(config.storage_key, "env.session");
        assert_eq!(config.post_logout_path, "/signed-out");
        assert_eq!(config.request_timeout, Duration::from_secs(5));

        // Scenario 4: unparseable timeout is an error, not a silent default
        env::set_var("UPTIME_REQUEST_TIMEOUT_SECS", "soon");
        assert!(matches!(
            SyncConfig::from_env().unwrap_err(),
            ConfigError::InvalidVar {
                var: "UPTIME_REQUEST_TIMEOUT_SECS",
                ..
            }
        ));

        // Clean up
        env::remove_var("UPTIME_API_BASE_URL");
        env::remove_var("UPTIME_SESSION_STORAGE_KEY");
        env::remove_var("UPTIME_POST_LOGOUT_PATH");
        env::remove_var("UPTIME_REQUEST_TIMEOUT_SECS");
    }
}
