//! Typed inbound engine events.
//!
//! The engine pushes JSON envelopes whose `type` field names one of a
//! closed set of event kinds. [`EngineEvent`] is the typed decoding of
//! that set, produced by [`Envelope::parse`](super::Envelope::parse);
//! anything outside the set lands in [`EngineEvent::Unknown`].
//!
//! # Event Kinds
//!
//! | Kind | Payload fields consumed |
//! |------|-------------------------|
//! | `InitialState` | `session_id`, `workers[]`, `alerts[]`, `rag_indexed` |
//! | `SystemMetrics` | `cpu`, `ram_gb` |
//! | `LogLine` | `time`, `source`, `level`, `message` |
//! | `BuildStarted` | `project` |
//! | `BuildLog` | `line` |
//! | `BuildFinished` | `success` |
//! | `ChatResponse` | `text`, `model` |
//! | `RagIndexComplete` | `total_files` |
//! | `RagSearchResult` | `results[]` |
//! | `AlertCreated` | `id`, `severity`, `title`, `message`, `details?` |
//! | `WorkerStatusUpdate` | `name`, `health` |
//! | `TelegramMessage` | `icon`, `text`, `timestamp` |
//!
//! There is no schema validation beyond the JSON parse of the envelope:
//! missing or mistyped fields decode to defaults.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

// ============================================================================
// WorkerHealth
// ============================================================================

/// Health state of an engine worker, as reported on the wire
/// (`RUNNING` | `ERROR` | `IDLE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerHealth {
    /// Worker is running normally.
    Running,
    /// Worker reported an error.
    Error,
    /// Worker is idle.
    #[default]
    Idle,
}

impl WorkerHealth {
    /// Decodes a wire health string. Unknown strings map to [`Self::Idle`].
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            "RUNNING" => Self::Running,
            "ERROR" => Self::Error,
            _ => Self::Idle,
        }
    }

    /// Returns the wire representation of this health state.
    #[inline]
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Error => "ERROR",
            Self::Idle => "IDLE",
        }
    }
}

// ============================================================================
// Payload Structs
// ============================================================================

/// Snapshot sent by the engine right after the socket opens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InitialState {
    /// Engine session identifier, if the engine has one.
    pub session_id: Option<String>,
    /// Known workers and their health.
    pub workers: Vec<WorkerUpdate>,
    /// Outstanding alerts.
    pub alerts: Vec<Alert>,
    /// Number of files in the RAG index, if indexing has run.
    pub rag_indexed: Option<u64>,
}

/// Periodic host metrics sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemMetrics {
    /// CPU utilization, 0–100.
    pub cpu: f64,
    /// Resident memory in gigabytes.
    pub ram_gb: f64,
}

/// One line for the live log panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogLine {
    /// Wall-clock time string as formatted by the engine.
    pub time: String,
    /// Log source (worker name, subsystem).
    pub source: String,
    /// Level string (`INFO`, `WARN`, ...).
    pub level: String,
    /// Log message body.
    pub message: String,
}

/// Completed chat turn from the engine's model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatReply {
    /// Response text.
    pub text: String,
    /// Model that produced the response.
    pub model: String,
}

/// One RAG search hit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RagHit {
    /// Source file path.
    pub file: String,
    /// Line number within the file, when the chunker tracked one.
    pub line: Option<u64>,
    /// Similarity score.
    pub score: f64,
    /// Matched chunk text.
    pub chunk: String,
}

/// Alert raised by the engine's log watcher.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alert {
    /// Alert identifier, used by the `ApplyFix` command.
    pub id: String,
    /// Severity string as reported by the engine.
    pub severity: String,
    /// Short title.
    pub title: String,
    /// Alert message body.
    pub message: String,
    /// Optional extended details.
    pub details: Option<String>,
}

/// Health update for a single worker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkerUpdate {
    /// Worker name.
    pub name: String,
    /// Current health.
    pub health: WorkerHealth,
}

/// Message relayed from the engine's Telegram bridge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TelegramNote {
    /// Icon glyph chosen by the bridge.
    pub icon: String,
    /// Message text.
    pub text: String,
    /// Timestamp string as formatted by the bridge.
    pub timestamp: String,
}

// ============================================================================
// Value Decoding
// ============================================================================

impl WorkerUpdate {
    /// Decodes a worker entry from a payload value, defaulting missing
    /// fields.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: str_field(value, "name"),
            health: WorkerHealth::from_wire(&str_field(value, "health")),
        }
    }
}

impl Alert {
    /// Decodes an alert from a payload value, defaulting missing fields.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: str_field(value, "id"),
            severity: str_field(value, "severity"),
            title: str_field(value, "title"),
            message: str_field(value, "message"),
            details: opt_str_field(value, "details"),
        }
    }
}

impl RagHit {
    /// Decodes a search hit from a payload value, defaulting missing
    /// fields.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            file: str_field(value, "file"),
            line: value.get("line").and_then(Value::as_u64),
            score: value.get("score").and_then(Value::as_f64).unwrap_or_default(),
            chunk: str_field(value, "chunk"),
        }
    }
}

/// Gets a string field from a payload object, defaulting to empty.
fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Gets an optional string field from a payload object.
fn opt_str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

// ============================================================================
// EngineEvent
// ============================================================================

/// Typed inbound event, decoded from the wire envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Full state snapshot sent on connect.
    InitialState(InitialState),

    /// Host metrics sample.
    SystemMetrics(SystemMetrics),

    /// Live log line.
    LogLine(LogLine),

    /// A build was kicked off.
    BuildStarted {
        /// Project being built.
        project: String,
    },

    /// One line of build output.
    BuildLog {
        /// Output line.
        line: String,
    },

    /// A build finished.
    BuildFinished {
        /// Whether the build succeeded.
        success: bool,
    },

    /// Chat model response.
    ChatResponse(ChatReply),

    /// RAG indexing pass finished.
    RagIndexComplete {
        /// Total files in the index.
        total_files: u64,
    },

    /// Results for an earlier `RagSearch` command.
    RagSearchResult {
        /// Matched chunks, best first.
        results: Vec<RagHit>,
    },

    /// New alert raised.
    AlertCreated(Alert),

    /// Worker health changed.
    WorkerStatusUpdate(WorkerUpdate),

    /// Message relayed from Telegram.
    TelegramMessage(TelegramNote),

    /// Event kind outside the recognized set.
    Unknown {
        /// The unrecognized `type` value.
        kind: String,
        /// Raw payload.
        payload: Value,
    },
}

impl EngineEvent {
    /// Returns the wire `type` string for this event.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::InitialState(_) => "InitialState",
            Self::SystemMetrics(_) => "SystemMetrics",
            Self::LogLine(_) => "LogLine",
            Self::BuildStarted { .. } => "BuildStarted",
            Self::BuildLog { .. } => "BuildLog",
            Self::BuildFinished { .. } => "BuildFinished",
            Self::ChatResponse(_) => "ChatResponse",
            Self::RagIndexComplete { .. } => "RagIndexComplete",
            Self::RagSearchResult { .. } => "RagSearchResult",
            Self::AlertCreated(_) => "AlertCreated",
            Self::WorkerStatusUpdate(_) => "WorkerStatusUpdate",
            Self::TelegramMessage(_) => "TelegramMessage",
            Self::Unknown { kind, .. } => kind,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
