//! Error types for the ridgeline track builder.
//!
//! This module provides error handling using [`thiserror`] for automatic
//! `Display` and `Error` trait implementations.
//!
//! # Error Hierarchy
//!
//! - [`CoreError`]: shared error type for configuration and input validation
//!
//! Stage-specific errors (mask, pipeline) live next to the code that raises
//! them in `ridgeline-signal` and `ridgeline-track`; this crate only defines
//! the failures every layer can produce.

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Shared error type for configuration and validation failures.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Configuration rejected at start-of-run
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
    },

    /// Validation error for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what validation failed
        message: String,
    },

    /// Invalid state for the requested operation
    #[error("Invalid state: expected {expected}, found {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },
}

impl CoreError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new invalid state error.
    #[must_use]
    pub fn invalid_state(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidState {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Configuration and validation failures are contract violations the
    /// caller must fix; none of them can be retried as-is.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Configuration { .. } | Self::Validation { .. } | Self::InvalidState { .. } => {
                false
            }
        }
    }
}
