//! Outbound command definitions.
//!
//! Commands are the client→engine half of the wire protocol. The enum is
//! adjacently tagged so a serialized command is exactly the wire
//! envelope, e.g. `Chat` becomes
//!
//! ```json
//! { "type": "Chat", "payload": { "message": "hi" } }
//! ```
//!
//! # Commands
//!
//! | Kind | Payload | Purpose |
//! |------|---------|---------|
//! | `Chat` | `message` | Send a chat prompt to the engine's model |
//! | `Rebuild` | `project` | Kick off a project rebuild |
//! | `ApplyFix` | `alert_id` | Approve the fix proposed for an alert |
//! | `RagSearch` | `query` | Run a RAG index search |
//! | `ExecuteCommand` | `command` | Run a whitelisted shell command |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ============================================================================
// EngineCommand
// ============================================================================

/// Commands the dashboard can send to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineCommand {
    /// Send a chat prompt.
    Chat {
        /// Prompt text.
        message: String,
    },

    /// Kick off a rebuild of the named project.
    Rebuild {
        /// Project to rebuild.
        project: String,
    },

    /// Approve the fix proposed for an alert.
    ApplyFix {
        /// Identifier of the alert being fixed.
        alert_id: String,
    },

    /// Search the RAG index.
    RagSearch {
        /// Search query.
        query: String,
    },

    /// Execute a whitelisted shell command on the engine host.
    ExecuteCommand {
        /// Command line to run.
        command: String,
    },
}

impl EngineCommand {
    /// Returns the wire `type` string for this command.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Chat { .. } => "Chat",
            Self::Rebuild { .. } => "Rebuild",
            Self::ApplyFix { .. } => "ApplyFix",
            Self::RagSearch { .. } => "RagSearch",
            Self::ExecuteCommand { .. } => "ExecuteCommand",
        }
    }

    /// Serializes the command to a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization
    /// fails.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
