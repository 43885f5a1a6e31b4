//! Wire protocol message types.
//!
//! This module defines the message format for communication between the
//! dashboard client (this crate) and the AXON engine.
//!
//! # Protocol Overview
//!
//! Both directions share one envelope shape: a JSON object per text
//! frame:
//!
//! ```json
//! { "type": "<string>", "payload": { ... } }
//! ```
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | [`EngineEvent`] | Engine → Client | State push (metrics, logs, alerts, ...) |
//! | [`EngineCommand`] | Client → Engine | UI command (chat, rebuild, ...) |
//!
//! Inbound frames decode to an [`Envelope`] first; registered handlers
//! see the raw payload, and [`Envelope::parse`] produces the typed
//! [`EngineEvent`] for the built-in dispatch path. There is no
//! request/response correlation on this wire: events and commands are
//! fire-and-forget.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `envelope` | The shared `{type, payload}` envelope |
//! | `event` | Typed inbound events and payload structs |
//! | `command` | Outbound command enum |

// ============================================================================
// Submodules
// ============================================================================

/// Outbound command definitions.
pub mod command;

/// The wire envelope shared by both directions.
pub mod envelope;

/// Typed inbound engine events.
pub mod event;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::EngineCommand;
pub use envelope::Envelope;
pub use event::{
    Alert, ChatReply, EngineEvent, InitialState, LogLine, RagHit, SystemMetrics, TelegramNote,
    WorkerHealth, WorkerUpdate,
};
