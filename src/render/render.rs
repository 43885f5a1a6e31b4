//! The renderer seam.

// ============================================================================
// Imports
// ============================================================================

use crate::protocol::{
    Alert, ChatReply, InitialState, LogLine, RagHit, SystemMetrics, TelegramNote, WorkerUpdate,
};

// ============================================================================
// Render
// ============================================================================

/// Receiver of the built-in dispatch path.
///
/// One method per recognized event kind, plus [`Render::connection_status`]
/// for transport transitions and [`Render::chat_sent`] for the local
/// echo of outgoing chat prompts. Every method defaults to a no-op, so
/// an implementation only overrides the panels it draws.
///
/// Methods are called synchronously on the link's supervisor task, in
/// event delivery order. Implementations must not block.
pub trait Render: Send + Sync {
    /// The transport opened (`true`) or closed (`false`).
    fn connection_status(&self, online: bool) {
        let _ = online;
    }

    /// A chat prompt was sent; echo it into the transcript.
    fn chat_sent(&self, message: &str) {
        let _ = message;
    }

    /// Full state snapshot, sent by the engine right after connect.
    fn initial_state(&self, state: &InitialState) {
        let _ = state;
    }

    /// Periodic host metrics sample.
    fn system_metrics(&self, metrics: &SystemMetrics) {
        let _ = metrics;
    }

    /// One line for the live log panel.
    fn log_line(&self, line: &LogLine) {
        let _ = line;
    }

    /// A build was kicked off.
    fn build_started(&self, project: &str) {
        let _ = project;
    }

    /// One line of build output.
    fn build_log(&self, line: &str) {
        let _ = line;
    }

    /// The build finished.
    fn build_finished(&self, success: bool) {
        let _ = success;
    }

    /// Chat model response.
    fn chat_response(&self, reply: &ChatReply) {
        let _ = reply;
    }

    /// RAG indexing pass finished.
    fn rag_index_complete(&self, total_files: u64) {
        let _ = total_files;
    }

    /// Results for an earlier search.
    fn rag_search_result(&self, results: &[RagHit]) {
        let _ = results;
    }

    /// New alert raised.
    fn alert_created(&self, alert: &Alert) {
        let _ = alert;
    }

    /// Worker health changed.
    fn worker_status(&self, update: &WorkerUpdate) {
        let _ = update;
    }

    /// Message relayed from Telegram.
    fn telegram_message(&self, note: &TelegramNote) {
        let _ = note;
    }
}

/// Renderer that draws nothing.
///
/// For headless uses of the link where only registered handlers matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRender;

impl Render for NullRender {}
