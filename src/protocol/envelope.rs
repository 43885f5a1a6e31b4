//! The wire envelope shared by both directions.
//!
//! Every frame on the socket is one JSON object of the shape
//!
//! ```json
//! { "type": "<string>", "payload": { ... } }
//! ```
//!
//! Inbound frames are decoded to an [`Envelope`] first (registered
//! handlers receive the raw payload), then [`Envelope::parse`] produces
//! the typed [`EngineEvent`] for the built-in dispatch path.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

use super::event::{
    Alert, ChatReply, EngineEvent, InitialState, LogLine, RagHit, SystemMetrics, TelegramNote,
    WorkerUpdate,
};

// ============================================================================
// Envelope
// ============================================================================

/// Wire envelope for inbound events and outbound commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Event or command kind.
    #[serde(rename = "type")]
    pub kind: String,

    /// Kind-specific payload. Opaque JSON; absent payloads decode as
    /// `null`.
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    /// Creates an envelope from a kind and payload.
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Decodes a text frame into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the frame is not
    /// valid JSON of the envelope shape.
    pub fn from_frame(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }

    /// Serializes the envelope to a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization
    /// fails.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses the envelope into a typed event.
    ///
    /// Unrecognized kinds produce [`EngineEvent::Unknown`]; payload
    /// fields that are missing or mistyped decode to defaults.
    #[must_use]
    pub fn parse(&self) -> EngineEvent {
        match self.kind.as_str() {
            "InitialState" => EngineEvent::InitialState(InitialState {
                session_id: self.get_optional_string("session_id"),
                workers: self.get_items("workers", WorkerUpdate::from_value),
                alerts: self.get_items("alerts", Alert::from_value),
                rag_indexed: self.payload.get("rag_indexed").and_then(Value::as_u64),
            }),

            "SystemMetrics" => EngineEvent::SystemMetrics(SystemMetrics {
                cpu: self.get_f64("cpu"),
                ram_gb: self.get_f64("ram_gb"),
            }),

            "LogLine" => EngineEvent::LogLine(LogLine {
                time: self.get_string("time"),
                source: self.get_string("source"),
                level: self.get_string("level"),
                message: self.get_string("message"),
            }),

            "BuildStarted" => EngineEvent::BuildStarted {
                project: self.get_string("project"),
            },

            "BuildLog" => EngineEvent::BuildLog {
                line: self.get_string("line"),
            },

            "BuildFinished" => EngineEvent::BuildFinished {
                success: self.get_bool("success"),
            },

            "ChatResponse" => EngineEvent::ChatResponse(ChatReply {
                text: self.get_string("text"),
                model: self.get_string("model"),
            }),

            "RagIndexComplete" => EngineEvent::RagIndexComplete {
                total_files: self.get_u64("total_files"),
            },

            "RagSearchResult" => EngineEvent::RagSearchResult {
                results: self.get_items("results", RagHit::from_value),
            },

            "AlertCreated" => EngineEvent::AlertCreated(Alert::from_value(&self.payload)),

            "WorkerStatusUpdate" => {
                EngineEvent::WorkerStatusUpdate(WorkerUpdate::from_value(&self.payload))
            }

            "TelegramMessage" => EngineEvent::TelegramMessage(TelegramNote {
                icon: self.get_string("icon"),
                text: self.get_string("text"),
                timestamp: self.get_string("timestamp"),
            }),

            _ => EngineEvent::Unknown {
                kind: self.kind.clone(),
                payload: self.payload.clone(),
            },
        }
    }

    // ========================================================================
    // Payload Accessors
    // ========================================================================

    /// Gets a string from the payload, defaulting to empty.
    #[inline]
    fn get_string(&self, key: &str) -> String {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Gets an optional string from the payload.
    #[inline]
    fn get_optional_string(&self, key: &str) -> Option<String> {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .map(ToString::to_string)
    }

    /// Gets a u64 from the payload, defaulting to 0.
    #[inline]
    fn get_u64(&self, key: &str) -> u64 {
        self.payload
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or_default()
    }

    /// Gets an f64 from the payload, defaulting to 0.0.
    #[inline]
    fn get_f64(&self, key: &str) -> f64 {
        self.payload
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or_default()
    }

    /// Gets a bool from the payload, defaulting to false.
    #[inline]
    fn get_bool(&self, key: &str) -> bool {
        self.payload
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    /// Decodes an array field item by item, skipping nothing: missing
    /// arrays decode as empty.
    fn get_items<T>(&self, key: &str, decode: fn(&Value) -> T) -> Vec<T> {
        self.payload
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().map(decode).collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
