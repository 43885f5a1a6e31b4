//! In-memory dashboard state.
//!
//! [`Dashboard`] is the reference [`Render`] implementation. It folds
//! the event stream into the state a UI would draw (panels for metrics,
//! workers, alerts, builds, chat, RAG and the rolling feeds) and
//! exposes snapshot accessors. A TUI or web frontend reads the
//! snapshots on its own redraw cadence instead of hooking every event.
//!
//! All state sits behind one mutex; events arrive on the link's
//! supervisor task while accessors are called from wherever the UI
//! runs.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;

use crate::protocol::{
    Alert, ChatReply, InitialState, LogLine, RagHit, SystemMetrics, TelegramNote, WorkerUpdate,
};

use super::feed::{Feed, LOG_FEED_CAP, TELEGRAM_FEED_CAP};
use super::render::Render;

// ============================================================================
// View Types
// ============================================================================

/// Coarse CPU load bucket, used by UIs to pick the gauge color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadLevel {
    /// Rounded CPU at or below 50%.
    Calm,
    /// Rounded CPU above 50%.
    Elevated,
    /// Rounded CPU above 70%.
    High,
}

impl LoadLevel {
    /// Buckets a rounded CPU percentage.
    #[must_use]
    pub fn from_cpu(cpu_percent: i64) -> Self {
        if cpu_percent > 70 {
            Self::High
        } else if cpu_percent > 50 {
            Self::Elevated
        } else {
            Self::Calm
        }
    }
}

/// Display-ready metrics sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsView {
    /// CPU rounded to a whole percent, e.g. `"85%"`.
    pub cpu_display: String,
    /// Resident memory with one decimal, e.g. `"3.2G"`.
    pub ram_display: String,
    /// Load bucket derived from the rounded CPU value.
    pub load: LoadLevel,
}

impl MetricsView {
    fn from_sample(metrics: &SystemMetrics) -> Self {
        let cpu_percent = metrics.cpu.round() as i64;
        Self {
            cpu_display: format!("{cpu_percent}%"),
            ram_display: format!("{:.1}G", metrics.ram_gb),
            load: LoadLevel::from_cpu(cpu_percent),
        }
    }
}

/// Build panel state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BuildPanel {
    /// No build has run in this session.
    #[default]
    Idle,
    /// A build is in flight.
    Running {
        /// Project being built.
        project: String,
    },
    /// The last build finished.
    Finished {
        /// Whether it succeeded.
        success: bool,
    },
}

impl BuildPanel {
    /// Returns `true` if a build is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Returns `true` if the last build has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    /// Returns `true` only for a finished, successful build.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Finished { success: true })
    }
}

/// One entry in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEntry {
    /// Prompt sent by the user, echoed locally at send time.
    User(String),
    /// Response from the engine's model.
    Engine {
        /// Response text.
        text: String,
        /// Model that produced it.
        model: String,
    },
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug)]
struct State {
    online: bool,
    session_id: Option<String>,
    metrics: Option<MetricsView>,
    workers: Vec<WorkerUpdate>,
    alerts: Vec<Alert>,
    build: BuildPanel,
    build_output: Vec<String>,
    chat: Vec<ChatEntry>,
    rag_indexed: Option<u64>,
    rag_hits: Vec<RagHit>,
    logs: Feed<LogLine>,
    telegram: Feed<TelegramNote>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            online: false,
            session_id: None,
            metrics: None,
            workers: Vec::new(),
            alerts: Vec::new(),
            build: BuildPanel::Idle,
            build_output: Vec::new(),
            chat: Vec::new(),
            rag_indexed: None,
            rag_hits: Vec::new(),
            logs: Feed::new(LOG_FEED_CAP),
            telegram: Feed::new(TELEGRAM_FEED_CAP),
        }
    }
}

/// Event-stream fold into drawable dashboard state.
#[derive(Debug)]
pub struct Dashboard {
    state: Mutex<State>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// Creates an empty, offline dashboard.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    // ========================================================================
    // Snapshot Accessors
    // ========================================================================

    /// Returns `true` while the link is connected.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.state.lock().online
    }

    /// Returns the engine session id from the initial snapshot.
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.state.lock().session_id.clone()
    }

    /// Returns the latest metrics sample, if one has arrived.
    #[must_use]
    pub fn metrics(&self) -> Option<MetricsView> {
        self.state.lock().metrics.clone()
    }

    /// Returns the known workers, in first-seen order.
    #[must_use]
    pub fn workers(&self) -> Vec<WorkerUpdate> {
        self.state.lock().workers.clone()
    }

    /// Returns outstanding alerts, newest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.state.lock().alerts.clone()
    }

    /// Returns the build panel state.
    #[must_use]
    pub fn build(&self) -> BuildPanel {
        self.state.lock().build.clone()
    }

    /// Returns output lines of the current or last build.
    #[must_use]
    pub fn build_output(&self) -> Vec<String> {
        self.state.lock().build_output.clone()
    }

    /// Returns the chat transcript, oldest first.
    #[must_use]
    pub fn chat(&self) -> Vec<ChatEntry> {
        self.state.lock().chat.clone()
    }

    /// Returns the RAG index size, if an indexing pass has completed.
    #[must_use]
    pub fn rag_indexed(&self) -> Option<u64> {
        self.state.lock().rag_indexed
    }

    /// Returns the hits of the latest RAG search.
    #[must_use]
    pub fn rag_hits(&self) -> Vec<RagHit> {
        self.state.lock().rag_hits.clone()
    }

    /// Returns retained log lines, oldest first. At most
    /// [`LOG_FEED_CAP`] entries.
    #[must_use]
    pub fn logs(&self) -> Vec<LogLine> {
        self.state.lock().logs.snapshot()
    }

    /// Returns retained Telegram messages, oldest first. At most
    /// [`TELEGRAM_FEED_CAP`] entries.
    #[must_use]
    pub fn telegram(&self) -> Vec<TelegramNote> {
        self.state.lock().telegram.snapshot()
    }
}

// ============================================================================
// Render Implementation
// ============================================================================

impl Render for Dashboard {
    fn connection_status(&self, online: bool) {
        // Panels keep their last-known content while offline.
        self.state.lock().online = online;
    }

    fn chat_sent(&self, message: &str) {
        self.state
            .lock()
            .chat
            .push(ChatEntry::User(message.to_string()));
    }

    fn initial_state(&self, state: &InitialState) {
        let mut dash = self.state.lock();
        dash.session_id = state.session_id.clone();
        dash.workers = state.workers.clone();
        // The snapshot lists alerts oldest first; the panel shows newest
        // first.
        dash.alerts = state.alerts.iter().rev().cloned().collect();
        dash.rag_indexed = state.rag_indexed;
    }

    fn system_metrics(&self, metrics: &SystemMetrics) {
        self.state.lock().metrics = Some(MetricsView::from_sample(metrics));
    }

    fn log_line(&self, line: &LogLine) {
        self.state.lock().logs.push(line.clone());
    }

    fn build_started(&self, project: &str) {
        let mut dash = self.state.lock();
        dash.build = BuildPanel::Running {
            project: project.to_string(),
        };
        dash.build_output.clear();
    }

    fn build_log(&self, line: &str) {
        self.state.lock().build_output.push(line.to_string());
    }

    fn build_finished(&self, success: bool) {
        self.state.lock().build = BuildPanel::Finished { success };
    }

    fn chat_response(&self, reply: &ChatReply) {
        self.state.lock().chat.push(ChatEntry::Engine {
            text: reply.text.clone(),
            model: reply.model.clone(),
        });
    }

    fn rag_index_complete(&self, total_files: u64) {
        self.state.lock().rag_indexed = Some(total_files);
    }

    fn rag_search_result(&self, results: &[RagHit]) {
        self.state.lock().rag_hits = results.to_vec();
    }

    fn alert_created(&self, alert: &Alert) {
        self.state.lock().alerts.insert(0, alert.clone());
    }

    fn worker_status(&self, update: &WorkerUpdate) {
        let mut dash = self.state.lock();
        match dash.workers.iter_mut().find(|w| w.name == update.name) {
            Some(worker) => worker.health = update.health,
            None => dash.workers.push(update.clone()),
        }
    }

    fn telegram_message(&self, note: &TelegramNote) {
        self.state.lock().telegram.push(note.clone());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::WorkerHealth;

    fn metrics(cpu: f64, ram_gb: f64) -> SystemMetrics {
        SystemMetrics { cpu, ram_gb }
    }

    #[test]
    fn test_metrics_formatting() {
        let dash = Dashboard::new();
        assert_eq!(dash.metrics(), None);

        dash.system_metrics(&metrics(85.0, 3.2));
        let view = dash.metrics().expect("sample stored");
        assert_eq!(view.cpu_display, "85%");
        assert_eq!(view.ram_display, "3.2G");
        assert_eq!(view.load, LoadLevel::High);
    }

    #[test]
    fn test_load_buckets_use_rounded_cpu() {
        // 70.4 rounds to 70, which is not above the High threshold.
        let dash = Dashboard::new();
        dash.system_metrics(&metrics(70.4, 1.0));
        let view = dash.metrics().expect("sample stored");
        assert_eq!(view.cpu_display, "70%");
        assert_eq!(view.load, LoadLevel::Elevated);

        dash.system_metrics(&metrics(70.6, 1.0));
        assert_eq!(dash.metrics().expect("sample").load, LoadLevel::High);

        dash.system_metrics(&metrics(50.0, 1.0));
        assert_eq!(dash.metrics().expect("sample").load, LoadLevel::Calm);
    }

    #[test]
    fn test_initial_state_populates_panels() {
        let dash = Dashboard::new();
        dash.initial_state(&InitialState {
            session_id: Some("sess-42".to_string()),
            workers: vec![WorkerUpdate {
                name: "log_watcher".to_string(),
                health: WorkerHealth::Running,
            }],
            alerts: vec![
                Alert {
                    id: "a1".to_string(),
                    ..Alert::default()
                },
                Alert {
                    id: "a2".to_string(),
                    ..Alert::default()
                },
            ],
            rag_indexed: Some(1280),
        });

        assert_eq!(dash.session_id().as_deref(), Some("sess-42"));
        assert_eq!(dash.workers().len(), 1);
        assert_eq!(dash.rag_indexed(), Some(1280));

        // Newest snapshot alert comes first.
        let alerts = dash.alerts();
        assert_eq!(alerts[0].id, "a2");
        assert_eq!(alerts[1].id, "a1");
    }

    #[test]
    fn test_alert_created_prepends() {
        let dash = Dashboard::new();
        dash.alert_created(&Alert {
            id: "old".to_string(),
            ..Alert::default()
        });
        dash.alert_created(&Alert {
            id: "new".to_string(),
            ..Alert::default()
        });

        let alerts = dash.alerts();
        assert_eq!(alerts[0].id, "new");
        assert_eq!(alerts[1].id, "old");
    }

    #[test]
    fn test_worker_upsert_by_name() {
        let dash = Dashboard::new();
        dash.worker_status(&WorkerUpdate {
            name: "rag_indexer".to_string(),
            health: WorkerHealth::Running,
        });
        dash.worker_status(&WorkerUpdate {
            name: "rag_indexer".to_string(),
            health: WorkerHealth::Error,
        });
        dash.worker_status(&WorkerUpdate {
            name: "log_watcher".to_string(),
            health: WorkerHealth::Idle,
        });

        let workers = dash.workers();
        assert_eq!(workers.len(), 2);
        assert_eq!(workers[0].name, "rag_indexer");
        assert_eq!(workers[0].health, WorkerHealth::Error);
    }

    #[test]
    fn test_build_lifecycle() {
        let dash = Dashboard::new();
        assert_eq!(dash.build(), BuildPanel::Idle);

        dash.build_started("axon");
        assert!(dash.build().is_running());

        dash.build_log("Compiling axon v0.1.0");
        dash.build_log("warning: unused import");
        assert_eq!(dash.build_output().len(), 2);

        dash.build_finished(false);
        assert!(dash.build().is_finished());
        assert!(!dash.build().succeeded());

        // A new build clears the previous output.
        dash.build_started("axon");
        assert!(dash.build_output().is_empty());
    }

    #[test]
    fn test_chat_transcript_order() {
        let dash = Dashboard::new();
        dash.chat_sent("why is the disk full?");
        dash.chat_response(&ChatReply {
            text: "check /var/log".to_string(),
            model: "qwen2.5".to_string(),
        });

        let chat = dash.chat();
        assert_eq!(chat.len(), 2);
        assert_eq!(chat[0], ChatEntry::User("why is the disk full?".to_string()));
        assert!(matches!(&chat[1], ChatEntry::Engine { model, .. } if model == "qwen2.5"));
    }

    #[test]
    fn test_rag_hits_replaced_per_search() {
        let dash = Dashboard::new();
        dash.rag_search_result(&[RagHit {
            file: "src/a.rs".to_string(),
            ..RagHit::default()
        }]);
        dash.rag_search_result(&[RagHit {
            file: "src/b.rs".to_string(),
            ..RagHit::default()
        }]);

        let hits = dash.rag_hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file, "src/b.rs");
    }

    #[test]
    fn test_log_feed_capped() {
        let dash = Dashboard::new();
        for n in 0..(LOG_FEED_CAP + 10) {
            dash.log_line(&LogLine {
                message: format!("line {n}"),
                ..LogLine::default()
            });
        }

        let logs = dash.logs();
        assert_eq!(logs.len(), LOG_FEED_CAP);
        assert_eq!(logs[0].message, "line 10");
    }

    #[test]
    fn test_telegram_feed_capped() {
        let dash = Dashboard::new();
        for n in 0..(TELEGRAM_FEED_CAP * 2) {
            dash.telegram_message(&TelegramNote {
                text: format!("msg {n}"),
                ..TelegramNote::default()
            });
        }
        assert_eq!(dash.telegram().len(), TELEGRAM_FEED_CAP);
    }

    #[test]
    fn test_offline_keeps_panels() {
        let dash = Dashboard::new();
        dash.connection_status(true);
        dash.system_metrics(&metrics(42.0, 1.5));
        dash.connection_status(false);

        assert!(!dash.is_online());
        assert!(dash.metrics().is_some());
    }
}
