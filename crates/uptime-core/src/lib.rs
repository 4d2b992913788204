//! Uptime Core Library
//!
//! Shared types for the Uptime support-ticket platform.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`UserId`, `AccountId`)
//! - [`error`] - Standardized error types (`UptimeError`)
//!
//! # Example
//!
//! ```
//! use uptime_core::{AccountId, UserId, UptimeError, Result};
//!
//! let user_id = UserId::new();
//! let account_id = AccountId::from("home-account-1.tenant-1");
//!
//! fn example() -> Result<()> {
//!     Err(UptimeError::Unauthorized { message: None })
//! }
//! ```

pub mod error;
pub mod ids;

pub use error::{Result, UptimeError};
pub use ids::{AccountId, UserId};
