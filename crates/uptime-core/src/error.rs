//! Error Types
//!
//! Standardized error types shared across Uptime services.
//!
//! # Example
//!
//! ```
//! use uptime_core::{UptimeError, Result};
//!
//! fn find_ticket(id: &str) -> Result<String> {
//!     if id.is_empty() {
//!         return Err(UptimeError::NotFound {
//!             resource: "Ticket".to_string(),
//!             id: None,
//!         });
//!     }
//!     Ok(format!("Ticket {}", id))
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Standardized error type for Uptime services.
///
/// Each variant maps to a common failure scenario and, for HTTP surfaces,
/// a conventional status code.
///
/// # Variants
///
/// - `Unauthorized` - Authentication/authorization failure (HTTP 401)
/// - `NotFound` - Resource not found (HTTP 404)
/// - `ValidationError` - Input validation failure (HTTP 400)
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UptimeError {
    /// Authentication or authorization failure.
    ///
    /// Use when no authenticated session is available or a caller lacks
    /// permission. Maps to HTTP 401 Unauthorized.
    #[error("Unauthorized{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Unauthorized {
        /// Optional message providing more context
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Requested resource was not found.
    ///
    /// Maps to HTTP 404 Not Found.
    #[error("{resource} not found{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    NotFound {
        /// The type of resource that was not found (e.g., "Ticket", "User")
        resource: String,
        /// Optional identifier of the resource
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Input validation failure.
    ///
    /// Maps to HTTP 400 Bad Request.
    #[error("Validation error on field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },
}

impl UptimeError {
    /// Shorthand for an `Unauthorized` error without extra context.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::Unauthorized { message: None }
    }
}

/// Type alias for Results using `UptimeError`.
pub type Result<T> = std::result::Result<T, UptimeError>;
