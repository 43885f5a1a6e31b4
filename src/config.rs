//! Link configuration options.
//!
//! Provides a type-safe interface for configuring the engine link:
//! endpoint address, reconnect delay, and pending-queue bounds.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use axon_link::LinkOptions;
//!
//! let options = LinkOptions::new()
//!     .with_endpoint("ws://127.0.0.1:7878/ws")
//!     .with_reconnect_delay(Duration::from_millis(500))
//!     .with_queue_limit(1024);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::link::OverflowPolicy;

// ============================================================================
// Constants
// ============================================================================

/// Default engine endpoint (local loopback, the engine bridge's bind port).
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:7878/ws";

/// Default delay between a transport close and the next connect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2000);

// ============================================================================
// LinkOptions
// ============================================================================

/// Engine link configuration options.
///
/// Controls where the link connects, how quickly it retries after a
/// disconnect, and whether the pending queue is bounded. The reconnect
/// delay is fixed: no backoff growth, no retry cap, no jitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// WebSocket address of the engine.
    pub endpoint: String,

    /// Fixed delay between reconnect attempts.
    pub reconnect_delay: Duration,

    /// Maximum pending-queue length. `None` means unbounded, which
    /// matches the original client but lets a long-disconnected link
    /// accumulate arbitrary backlog.
    pub queue_limit: Option<usize>,

    /// What to do with a new frame when the bounded queue is full.
    pub overflow: OverflowPolicy,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl LinkOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            queue_limit: None,
            overflow: OverflowPolicy::EvictOldest,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl LinkOptions {
    /// Sets the engine endpoint address.
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the fixed reconnect delay.
    #[inline]
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Bounds the pending queue to `limit` frames.
    #[inline]
    #[must_use]
    pub fn with_queue_limit(mut self, limit: usize) -> Self {
        self.queue_limit = Some(limit);
        self
    }

    /// Sets the overflow policy for a bounded queue.
    #[inline]
    #[must_use]
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl LinkOptions {
    /// Parses and validates the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the endpoint is not a valid
    /// URL or its scheme is not `ws`/`wss`.
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| Error::invalid_endpoint(&self.endpoint, e.to_string()))?;

        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::invalid_endpoint(
                &self.endpoint,
                format!("scheme must be ws or wss, got {other}"),
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LinkOptions::new();
        assert_eq!(options.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(options.reconnect_delay, Duration::from_millis(2000));
        assert_eq!(options.queue_limit, None);
        assert_eq!(options.overflow, OverflowPolicy::EvictOldest);
    }

    #[test]
    fn test_builder_chain() {
        let options = LinkOptions::new()
            .with_endpoint("ws://10.0.0.1:9000/ws")
            .with_reconnect_delay(Duration::from_millis(100))
            .with_queue_limit(16)
            .with_overflow(OverflowPolicy::RejectNewest);

        assert_eq!(options.endpoint, "ws://10.0.0.1:9000/ws");
        assert_eq!(options.reconnect_delay, Duration::from_millis(100));
        assert_eq!(options.queue_limit, Some(16));
        assert_eq!(options.overflow, OverflowPolicy::RejectNewest);
    }

    #[test]
    fn test_default_endpoint_is_valid() {
        let url = LinkOptions::new().endpoint_url().expect("valid default");
        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.port(), Some(7878));
    }

    #[test]
    fn test_rejects_non_ws_scheme() {
        let options = LinkOptions::new().with_endpoint("http://127.0.0.1:7878/ws");
        let err = options.endpoint_url().expect_err("http must be rejected");
        assert!(err.is_config_error());
    }

    #[test]
    fn test_rejects_garbage_endpoint() {
        let options = LinkOptions::new().with_endpoint("not a url");
        assert!(options.endpoint_url().is_err());
    }
}
