//! AXON Link - Reconnecting dashboard client for the AXON engine.
//!
//! This library maintains a live WebSocket link between a dashboard UI
//! and the AXON engine: it dials, reconnects forever on a fixed delay,
//! queues commands sent while offline, and routes engine events to a
//! renderer.
//!
//! # Architecture
//!
//! The link follows a supervisor model:
//!
//! - **[`EngineLink`]**: owns the socket, the reconnect loop, and the
//!   pending queue; all IO happens on one spawned task
//! - **[`Render`]**: the drawing seam; exactly one method per recognized
//!   event kind, called in delivery order
//! - **Handlers**: closures registered per event kind via
//!   [`EngineLink::on`], run before the renderer with the raw payload
//!
//! Key design principles:
//!
//! - `send` never fails because of connectivity: offline frames queue
//!   and flush, in order, before any later send
//! - Reconnection is silent and indefinite: fixed delay, no backoff
//! - A malformed frame is dropped; it never tears the connection down
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use axon_link::{Dashboard, EngineLink, LinkOptions, Render, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let dashboard = Arc::new(Dashboard::new());
//!     let link = EngineLink::new(LinkOptions::new(), Arc::clone(&dashboard) as Arc<dyn Render>);
//!
//!     // React to raw events alongside the built-in dashboard fold
//!     link.on("AlertCreated", |payload| {
//!         println!("alert: {payload}");
//!     });
//!
//!     link.connect()?;
//!     link.send_chat("summarize the last build failure")?;
//!
//!     // ... drive a UI from dashboard.metrics(), dashboard.logs(), ...
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Endpoint and reconnect configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`link`] | Connection supervisor, pending queue, handler registry |
//! | [`protocol`] | Wire envelope, events, and commands |
//! | [`render`] | The [`Render`] seam and the reference [`Dashboard`] |
//!
//! # Wire Format
//!
//! Every frame in both directions is one JSON object:
//!
//! ```json
//! { "type": "<string>", "payload": { ... } }
//! ```

// ============================================================================
// Modules
// ============================================================================

/// Endpoint and reconnect configuration.
///
/// [`LinkOptions::new()`] gives the stock local-engine setup.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// The engine link: supervisor, queue, registry.
pub mod link;

/// Wire protocol message types.
///
/// The shared envelope plus typed inbound events and outbound commands.
pub mod protocol;

/// Rendering: the [`Render`] seam and the reference [`Dashboard`].
pub mod render;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::{DEFAULT_ENDPOINT, DEFAULT_RECONNECT_DELAY, LinkOptions};

// Error types
pub use error::{Error, Result};

// Link types
pub use link::{EngineLink, EventHandler, HandlerRegistry, OverflowPolicy, PendingQueue};

// Protocol types
pub use protocol::{
    Alert, ChatReply, EngineCommand, EngineEvent, Envelope, InitialState, LogLine, RagHit,
    SystemMetrics, TelegramNote, WorkerHealth, WorkerUpdate,
};

// Render types
pub use render::{BuildPanel, ChatEntry, Dashboard, LoadLevel, MetricsView, NullRender, Render};
