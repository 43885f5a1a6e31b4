//! Engine link: connection lifecycle, pending queue, handler registry.
//!
//! The centerpiece is [`EngineLink`], which owns the WebSocket transport
//! and everything around it. Its collaborators are small and separately
//! testable:
//!
//! | Type | Role |
//! |------|------|
//! | [`EngineLink`] | Connect/reconnect supervisor, send paths, dispatch |
//! | [`PendingQueue`] | FIFO buffer for frames sent while disconnected |
//! | [`HandlerRegistry`] | User handlers keyed by event kind |
//!
//! # Send Semantics
//!
//! `send` never fails because of connectivity. Connected frames go out
//! immediately; disconnected frames queue and flush, in original order,
//! before any later send once the link is back up.

// ============================================================================
// Submodules
// ============================================================================

/// Connection supervisor and session loop.
pub mod connection;

/// FIFO pending frame queue.
pub mod queue;

/// Event handler registry.
pub mod registry;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::EngineLink;
pub use queue::{OverflowPolicy, PendingQueue};
pub use registry::{EventHandler, HandlerRegistry};
