//! Error types for the engine link.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use axon_link::{EngineLink, Result};
//!
//! fn example(link: &EngineLink) -> Result<()> {
//!     link.send_chat("hello engine")?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::InvalidEndpoint`] |
//! | Queueing | [`Error::QueueFull`] |
//! | Serialization | [`Error::Json`] |
//!
//! Transport failures never surface through this type: the link absorbs
//! them internally and reconnects forever. The variants here cover the
//! caller-facing edges only.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint address is not a valid WebSocket URL.
    ///
    /// Returned by [`EngineLink::connect`](crate::EngineLink::connect)
    /// when the configured endpoint fails to parse or uses a scheme
    /// other than `ws`/`wss`.
    #[error("Invalid endpoint {endpoint}: {message}")]
    InvalidEndpoint {
        /// The offending endpoint string.
        endpoint: String,
        /// Description of why it was rejected.
        message: String,
    },

    /// Bounded pending queue rejected a frame.
    ///
    /// Only returned when a queue limit is configured with
    /// [`OverflowPolicy::RejectNewest`](crate::link::OverflowPolicy).
    #[error("Pending queue full: limit {limit}")]
    QueueFull {
        /// The configured queue limit.
        limit: usize,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid endpoint error.
    #[inline]
    pub fn invalid_endpoint(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a queue full error.
    #[inline]
    pub fn queue_full(limit: usize) -> Self {
        Self::QueueFull { limit }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a queue overflow.
    #[inline]
    #[must_use]
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidEndpoint { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_endpoint_display() {
        let err = Error::invalid_endpoint("http://x", "scheme must be ws or wss");
        assert_eq!(
            err.to_string(),
            "Invalid endpoint http://x: scheme must be ws or wss"
        );
    }

    #[test]
    fn test_is_overflow() {
        let full = Error::queue_full(8);
        assert!(full.is_overflow());
        assert_eq!(full.to_string(), "Pending queue full: limit 8");
        assert!(!Error::invalid_endpoint("x", "y").is_overflow());
    }

    #[test]
    fn test_is_config_error() {
        assert!(Error::invalid_endpoint("x", "y").is_config_error());
        assert!(!Error::queue_full(1).is_config_error());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
