//! Common error handling for the PRBAC bridge
//!
//! Provides the process-level error type returned from `main` and the
//! stable error codes attached to HTTP error bodies. Library crates keep
//! their own error enums; this crate is where they meet at the process
//! boundary.
//!
//! # Error Categories
//!
//! - **ConfigError**: settings or catalog could not be loaded
//! - **NetworkError**: binding the listener or reaching the backend failed
//! - **ServerError**: the HTTP server stopped with an error
//! - **InternalError**: anything else
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, PrbacError, Result};
//!
//! fn load_catalog(path: &str) -> Result<()> {
//!     if path.is_empty() {
//!         return Err(PrbacError::ConfigError("catalog path must not be empty".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! let err = load_catalog("").unwrap_err();
//! assert_eq!(err.code(), codes::config::INVALID_SETTINGS);
//! ```

pub mod codes;
pub mod types;

pub use types::*;
