//! Engine connection and session loop.
//!
//! [`EngineLink`] owns the WebSocket connection to the engine, survives
//! disconnection by reconnecting on a fixed delay, parks outbound frames
//! that cannot be sent immediately, and routes inbound events to
//! registered handlers and the [`Render`] collaborator.
//!
//! # Event Loop
//!
//! `connect` spawns a supervisor task that loops forever:
//!
//! 1. Dial the engine endpoint.
//! 2. On success: notify the renderer, flush the pending queue in FIFO
//!    order, then run the session `select!` over the socket and an
//!    outbound channel.
//! 3. On session end or dial failure: sleep the fixed reconnect delay
//!    and try again. No backoff growth, no retry cap, no jitter.
//!
//! All dispatch runs on the supervisor task: inbound frames are handled
//! strictly in delivery order and the renderer is called synchronously.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{Notify, mpsc};
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};

use crate::config::LinkOptions;
use crate::error::Result;
use crate::protocol::{EngineCommand, EngineEvent, Envelope};
use crate::render::Render;

use super::queue::PendingQueue;
use super::registry::{EventHandler, HandlerRegistry};

// ============================================================================
// Types
// ============================================================================

/// Client-side WebSocket stream type.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the split stream.
type WsSink = SplitSink<WsStream, Message>;

// ============================================================================
// Shared State
// ============================================================================

/// Outbound state: the connection flag, the pending queue, and the
/// handle to the live session's writer channel.
///
/// All three live behind one mutex so the flag and the queue can never
/// be observed out of sync: a send that finds `connected == true` is
/// guaranteed the queue has already been flushed.
struct Outbound {
    connected: bool,
    queue: PendingQueue,
    tx: Option<mpsc::UnboundedSender<String>>,
}

/// State shared between the link handle and the supervisor task.
struct Shared {
    outbound: Mutex<Outbound>,
    registry: Mutex<HandlerRegistry>,
    shutdown: AtomicBool,
    shutdown_notify: Notify,
}

// ============================================================================
// EngineLink
// ============================================================================

/// Reconnecting client link to the AXON engine.
///
/// Owns the transport lifecycle (connect / reconnect), the pending
/// outbound queue, and inbound event dispatch. Cheap to clone via the
/// shared state; UI code holds one link and calls the command wrappers
/// from its event bindings.
///
/// # Thread Safety
///
/// `EngineLink` is `Send + Sync`. `send` and `on` never block on IO;
/// all socket work happens on the internal supervisor task.
pub struct EngineLink {
    options: LinkOptions,
    renderer: Arc<dyn Render>,
    shared: Arc<Shared>,
    running: AtomicBool,
}

impl EngineLink {
    /// Creates a link with the given options and renderer.
    ///
    /// The link starts disconnected; call [`EngineLink::connect`] to
    /// spawn the supervisor. Commands sent before that are queued.
    #[must_use]
    pub fn new(options: LinkOptions, renderer: Arc<dyn Render>) -> Self {
        let shared = Arc::new(Shared {
            outbound: Mutex::new(Outbound {
                connected: false,
                queue: PendingQueue::new(options.queue_limit, options.overflow),
                tx: None,
            }),
            registry: Mutex::new(HandlerRegistry::new()),
            shutdown: AtomicBool::new(false),
            shutdown_notify: Notify::new(),
        });

        Self {
            options,
            renderer,
            shared,
            running: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Spawns the supervisor task that dials the engine and reconnects
    /// forever.
    ///
    /// Guarded against re-entry: a second call while the supervisor is
    /// live logs a warning and returns without spawning a duplicate.
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`](crate::Error::InvalidEndpoint)
    /// if the configured endpoint is not a valid `ws`/`wss` URL.
    pub fn connect(&self) -> Result<()> {
        self.options.endpoint_url()?;

        if self.running.swap(true, Ordering::SeqCst) {
            warn!("connect called while link is already running");
            return Ok(());
        }

        tokio::spawn(run_supervisor(
            self.options.clone(),
            Arc::clone(&self.shared),
            Arc::clone(&self.renderer),
        ));

        Ok(())
    }

    /// Stops the supervisor and closes the connection.
    ///
    /// Terminal: a stopped link does not reconnect. Queued frames are
    /// kept but will never be flushed.
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.shutdown_notify.notify_one();
    }

    /// Returns `true` if the transport is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.outbound.lock().connected
    }

    /// Returns the number of frames waiting for connectivity.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.outbound.lock().queue.len()
    }

    // ========================================================================
    // Outbound
    // ========================================================================

    /// Sends a command to the engine.
    ///
    /// If the transport is open the frame goes out immediately;
    /// otherwise it is queued and delivered, in original order, as soon
    /// as connectivity is restored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`](crate::Error::QueueFull) when a
    /// bounded queue with the reject policy is at its limit, or
    /// [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn send(&self, command: &EngineCommand) -> Result<()> {
        let frame = command.to_frame()?;
        trace!(kind = command.kind(), "command serialized");
        self.dispatch_outbound(frame)
    }

    /// Sends a raw envelope, for command kinds this crate does not model.
    ///
    /// # Errors
    ///
    /// Same as [`EngineLink::send`].
    pub fn send_raw(&self, kind: impl Into<String>, payload: Value) -> Result<()> {
        let frame = Envelope::new(kind, payload).to_frame()?;
        self.dispatch_outbound(frame)
    }

    /// Routes a serialized frame: straight to the live session when
    /// connected, to the pending queue otherwise.
    fn dispatch_outbound(&self, frame: String) -> Result<()> {
        let mut outbound = self.shared.outbound.lock();

        if outbound.connected {
            // Defensive re-check: the flag can be stale for the brief
            // window between a session dying and the supervisor noticing.
            let handed_off = match &outbound.tx {
                Some(tx) => tx.send(frame).map_err(|e| e.0),
                None => Err(frame),
            };

            match handed_off {
                Ok(()) => return Ok(()),
                Err(frame) => {
                    debug!("stale connected state, frame queued instead");
                    outbound.connected = false;
                    outbound.tx = None;
                    return outbound.queue.push(frame);
                }
            }
        }

        outbound.queue.push(frame)
    }

    // ========================================================================
    // Command Wrappers
    // ========================================================================

    /// Sends a chat prompt and echoes it to the renderer's transcript.
    ///
    /// # Errors
    ///
    /// Same as [`EngineLink::send`].
    pub fn send_chat(&self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        self.send(&EngineCommand::Chat {
            message: message.clone(),
        })?;
        self.renderer.chat_sent(&message);
        Ok(())
    }

    /// Requests a rebuild of the named project.
    ///
    /// # Errors
    ///
    /// Same as [`EngineLink::send`].
    pub fn request_rebuild(&self, project: impl Into<String>) -> Result<()> {
        self.send(&EngineCommand::Rebuild {
            project: project.into(),
        })
    }

    /// Approves the fix proposed for an alert.
    ///
    /// # Errors
    ///
    /// Same as [`EngineLink::send`].
    pub fn apply_fix(&self, alert_id: impl Into<String>) -> Result<()> {
        self.send(&EngineCommand::ApplyFix {
            alert_id: alert_id.into(),
        })
    }

    /// Runs a RAG index search.
    ///
    /// # Errors
    ///
    /// Same as [`EngineLink::send`].
    pub fn rag_search(&self, query: impl Into<String>) -> Result<()> {
        self.send(&EngineCommand::RagSearch {
            query: query.into(),
        })
    }

    /// Executes a whitelisted shell command on the engine host.
    ///
    /// # Errors
    ///
    /// Same as [`EngineLink::send`].
    pub fn execute_command(&self, command: impl Into<String>) -> Result<()> {
        self.send(&EngineCommand::ExecuteCommand {
            command: command.into(),
        })
    }

    // ========================================================================
    // Inbound Registration
    // ========================================================================

    /// Registers a handler for an inbound event kind.
    ///
    /// Handlers accumulate and run in registration order with the raw
    /// envelope payload, before the built-in renderer call. There is no
    /// unregistration. Unrecognized kinds still reach their handlers.
    /// A handler may itself register handlers; they take effect from
    /// the next event.
    pub fn on(&self, kind: impl Into<String>, handler: impl Fn(&Value) + Send + Sync + 'static) {
        self.register(kind, Arc::new(handler));
    }

    /// Registers a shared handler handle. See [`EngineLink::on`].
    pub fn register(&self, kind: impl Into<String>, handler: EventHandler) {
        self.shared.registry.lock().register(kind, handler);
    }
}

// ============================================================================
// Supervisor
// ============================================================================

/// Dial-flush-session loop with indefinite fixed-delay reconnect.
async fn run_supervisor(options: LinkOptions, shared: Arc<Shared>, renderer: Arc<dyn Render>) {
    let endpoint = options.endpoint.clone();

    loop {
        if shared.shutdown.load(Ordering::SeqCst) {
            break;
        }

        match connect_async(endpoint.as_str()).await {
            Ok((socket, _response)) => {
                info!(endpoint = %endpoint, "connected to engine");
                renderer.connection_status(true);

                run_session(socket, &shared, renderer.as_ref()).await;

                renderer.connection_status(false);
                debug!(
                    delay_ms = options.reconnect_delay.as_millis() as u64,
                    "disconnected from engine, reconnecting"
                );
            }
            Err(e) => {
                warn!(error = %e, endpoint = %endpoint, "connect attempt failed");
            }
        }

        if shared.shutdown.load(Ordering::SeqCst) {
            break;
        }

        tokio::select! {
            () = sleep(options.reconnect_delay) => {}
            () = shared.shutdown_notify.notified() => break,
        }
    }

    debug!("link supervisor terminated");
}

/// Runs one connected session: flush the pending queue, then loop over
/// inbound frames and outbound handoffs until the socket dies.
async fn run_session(socket: WsStream, shared: &Arc<Shared>, renderer: &dyn Render) {
    let (mut ws_write, mut ws_read) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    if !flush_pending(&mut ws_write, shared, &tx).await {
        return;
    }

    loop {
        tokio::select! {
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(text.as_str(), shared, renderer);
                    }

                    Some(Ok(Message::Close(_))) => {
                        debug!("socket closed by engine");
                        break;
                    }

                    Some(Err(e)) => {
                        // Observability only; the stream ending is what
                        // actually tears the session down.
                        error!(error = %e, "websocket error");
                        break;
                    }

                    None => {
                        debug!("websocket stream ended");
                        break;
                    }

                    // Ignore Binary, Ping, Pong
                    _ => {}
                }
            }

            frame = rx.recv() => {
                match frame {
                    Some(frame) => {
                        if let Err(e) = ws_write.send(Message::Text(frame.clone().into())).await {
                            warn!(error = %e, "send failed, frame re-queued");
                            shared.outbound.lock().queue.push_front(frame);
                            break;
                        }
                    }
                    None => break,
                }
            }

            () = shared.shutdown_notify.notified() => {
                debug!("shutdown requested, closing socket");
                let _ = ws_write.close().await;
                break;
            }
        }
    }

    close_session(shared, &mut rx);
}

/// Drains the pending queue over a fresh socket, then marks the link
/// connected and installs the session writer channel before any
/// new send may bypass the queue.
///
/// Returns `false` if the socket died mid-flush; the unsent frame is
/// put back at the head of the queue.
async fn flush_pending(
    ws_write: &mut WsSink,
    shared: &Arc<Shared>,
    tx: &mpsc::UnboundedSender<String>,
) -> bool {
    let mut flushed = 0_usize;

    loop {
        // Pop one frame under the lock; once the queue is empty, flip
        // the flag and install the channel within the same critical
        // section so no send can slip in between.
        let frame = {
            let mut outbound = shared.outbound.lock();
            match outbound.queue.pop_front() {
                Some(frame) => frame,
                None => {
                    outbound.connected = true;
                    outbound.tx = Some(tx.clone());
                    break;
                }
            }
        };

        if let Err(e) = ws_write.send(Message::Text(frame.clone().into())).await {
            warn!(error = %e, "flush failed, frame re-queued");
            shared.outbound.lock().queue.push_front(frame);
            return false;
        }

        flushed += 1;
    }

    if flushed > 0 {
        debug!(flushed, "pending queue flushed");
    }
    true
}

/// Marks the link disconnected and spills frames stranded in the
/// session channel back to the head of the queue, preserving order.
fn close_session(shared: &Arc<Shared>, rx: &mut mpsc::UnboundedReceiver<String>) {
    {
        let mut outbound = shared.outbound.lock();
        outbound.connected = false;
        outbound.tx = None;
    }

    let mut stranded = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        stranded.push(frame);
    }

    if !stranded.is_empty() {
        let count = stranded.len();
        let mut outbound = shared.outbound.lock();
        for frame in stranded.into_iter().rev() {
            outbound.queue.push_front(frame);
        }
        debug!(count, "re-queued frames stranded by disconnect");
    }
}

// ============================================================================
// Inbound Dispatch
// ============================================================================

/// Handles one inbound text frame: decode the envelope, run registered
/// handlers in order, then exactly one built-in renderer call.
fn handle_frame(text: &str, shared: &Shared, renderer: &dyn Render) {
    let envelope = match Envelope::from_frame(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "dropping malformed frame");
            return;
        }
    };

    // Snapshot the handler list so user callbacks run with no registry
    // lock held; a callback may register further handlers.
    let handlers = shared.registry.lock().handlers_for(&envelope.kind);
    for handler in &handlers {
        handler(&envelope.payload);
    }

    match envelope.parse() {
        EngineEvent::InitialState(state) => renderer.initial_state(&state),
        EngineEvent::SystemMetrics(metrics) => renderer.system_metrics(&metrics),
        EngineEvent::LogLine(line) => renderer.log_line(&line),
        EngineEvent::BuildStarted { project } => renderer.build_started(&project),
        EngineEvent::BuildLog { line } => renderer.build_log(&line),
        EngineEvent::BuildFinished { success } => renderer.build_finished(success),
        EngineEvent::ChatResponse(reply) => renderer.chat_response(&reply),
        EngineEvent::RagIndexComplete { total_files } => renderer.rag_index_complete(total_files),
        EngineEvent::RagSearchResult { results } => renderer.rag_search_result(&results),
        EngineEvent::AlertCreated(alert) => renderer.alert_created(&alert),
        EngineEvent::WorkerStatusUpdate(update) => renderer.worker_status(&update),
        EngineEvent::TelegramMessage(note) => renderer.telegram_message(&note),
        EngineEvent::Unknown { kind, .. } => trace!(kind = %kind, "no built-in handler"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    use crate::render::{Dashboard, LoadLevel, NullRender};

    /// Enables `RUST_LOG`-controlled tracing output for test runs.
    fn trace_init() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Binds a loopback listener and returns it with its ws URL.
    async fn bind_server() -> (TcpListener, String) {
        trace_init();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        (listener, format!("ws://127.0.0.1:{port}/ws"))
    }

    /// Accepts one client and upgrades it to a WebSocket.
    async fn accept_client(listener: &TcpListener) -> WebSocketStream<TcpStream> {
        let (stream, _) = timeout(Duration::from_secs(5), listener.accept())
            .await
            .expect("client in time")
            .expect("accept");
        tokio_tungstenite::accept_async(stream)
            .await
            .expect("upgrade")
    }

    /// Polls `check` until it passes, panicking after five seconds.
    async fn wait_until(check: impl Fn() -> bool) {
        for _ in 0..500 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    fn fast_options(url: &str) -> LinkOptions {
        LinkOptions::new()
            .with_endpoint(url)
            .with_reconnect_delay(Duration::from_millis(50))
    }

    async fn next_envelope(server: &mut WebSocketStream<TcpStream>) -> Envelope {
        let message = timeout(Duration::from_secs(5), server.next())
            .await
            .expect("frame in time")
            .expect("stream open")
            .expect("frame ok");
        Envelope::from_frame(message.to_text().expect("text frame")).expect("envelope")
    }

    #[tokio::test]
    async fn test_disconnected_sends_queue_and_flush_in_order() {
        let (listener, url) = bind_server().await;
        let link = EngineLink::new(fast_options(&url), Arc::new(NullRender));

        link.send_chat("hi").expect("queued");
        link.request_rebuild("axon").expect("queued");
        link.rag_search("vector store").expect("queued");
        assert_eq!(link.pending_count(), 3);
        assert!(!link.is_connected());

        link.connect().expect("spawn supervisor");
        let mut server = accept_client(&listener).await;

        // The Chat issued first while disconnected is the first frame out.
        let first = next_envelope(&mut server).await;
        assert_eq!(first.kind, "Chat");
        assert_eq!(first.payload, json!({"message": "hi"}));

        assert_eq!(next_envelope(&mut server).await.kind, "Rebuild");
        assert_eq!(next_envelope(&mut server).await.kind, "RagSearch");

        wait_until(|| link.pending_count() == 0).await;
        link.shutdown();
    }

    #[tokio::test]
    async fn test_connected_send_bypasses_queue() {
        let (listener, url) = bind_server().await;
        let link = EngineLink::new(fast_options(&url), Arc::new(NullRender));
        link.connect().expect("spawn supervisor");

        let mut server = accept_client(&listener).await;
        wait_until(|| link.is_connected()).await;

        link.apply_fix("alert-7").expect("send");
        assert_eq!(link.pending_count(), 0);

        let envelope = next_envelope(&mut server).await;
        assert_eq!(envelope.kind, "ApplyFix");
        assert_eq!(envelope.payload, json!({"alert_id": "alert-7"}));

        link.shutdown();
    }

    #[tokio::test]
    async fn test_inbound_dispatch_runs_both_paths() {
        let (listener, url) = bind_server().await;
        let dashboard = Arc::new(Dashboard::new());
        let link = EngineLink::new(fast_options(&url), Arc::clone(&dashboard) as Arc<dyn Render>);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        link.on("SystemMetrics", move |payload| {
            seen_clone.lock().push(payload.clone());
        });

        link.connect().expect("spawn supervisor");
        let mut server = accept_client(&listener).await;

        server
            .send(Message::text(
                r#"{"type":"SystemMetrics","payload":{"cpu":85,"ram_gb":3.2}}"#,
            ))
            .await
            .expect("push metrics");

        wait_until(|| dashboard.metrics().is_some()).await;

        let metrics = dashboard.metrics().expect("metrics rendered");
        assert_eq!(metrics.cpu_display, "85%");
        assert_eq!(metrics.ram_display, "3.2G");
        assert_eq!(metrics.load, LoadLevel::High);

        let payloads = seen.lock().clone();
        assert_eq!(payloads, vec![json!({"cpu": 85, "ram_gb": 3.2})]);

        link.shutdown();
    }

    #[tokio::test]
    async fn test_malformed_frame_dropped_link_survives() {
        let (listener, url) = bind_server().await;
        let dashboard = Arc::new(Dashboard::new());
        let link = EngineLink::new(fast_options(&url), Arc::clone(&dashboard) as Arc<dyn Render>);
        link.connect().expect("spawn supervisor");

        let mut server = accept_client(&listener).await;
        server
            .send(Message::text("this is not json"))
            .await
            .expect("push garbage");
        server
            .send(Message::text(
                r#"{"type":"LogLine","payload":{"time":"12:00:01","source":"core","level":"INFO","message":"ok"}}"#,
            ))
            .await
            .expect("push log line");

        // The garbage is dropped; the following frame still dispatches.
        wait_until(|| dashboard.logs().len() == 1).await;
        assert!(link.is_connected());

        link.shutdown();
    }

    #[tokio::test]
    async fn test_unknown_kind_fires_handlers_only() {
        let (listener, url) = bind_server().await;
        let dashboard = Arc::new(Dashboard::new());
        let link = EngineLink::new(fast_options(&url), Arc::clone(&dashboard) as Arc<dyn Render>);

        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = Arc::clone(&fired);
        link.on("FutureEvent", move |_| {
            fired_clone.store(true, Ordering::SeqCst);
        });

        link.connect().expect("spawn supervisor");
        let mut server = accept_client(&listener).await;
        server
            .send(Message::text(r#"{"type":"FutureEvent","payload":{}}"#))
            .await
            .expect("push unknown");

        wait_until(|| fired.load(Ordering::SeqCst)).await;
        assert!(dashboard.logs().is_empty());

        link.shutdown();
    }

    #[tokio::test]
    async fn test_handler_may_register_handlers_during_dispatch() {
        let (listener, url) = bind_server().await;
        let link = Arc::new(EngineLink::new(fast_options(&url), Arc::new(NullRender)));

        // The outer handler registers an inner one from inside dispatch;
        // the inner handler fires from the next matching event.
        let inner_fired = Arc::new(AtomicBool::new(false));
        let link_clone = Arc::clone(&link);
        let inner_fired_clone = Arc::clone(&inner_fired);
        link.on("LogLine", move |_| {
            let inner_fired = Arc::clone(&inner_fired_clone);
            link_clone.on("LogLine", move |_| {
                inner_fired.store(true, Ordering::SeqCst);
            });
        });

        link.connect().expect("spawn supervisor");
        let mut server = accept_client(&listener).await;

        let frame = r#"{"type":"LogLine","payload":{"message":"tick"}}"#;
        server.send(Message::text(frame)).await.expect("first frame");
        server.send(Message::text(frame)).await.expect("second frame");

        wait_until(|| inner_fired.load(Ordering::SeqCst)).await;

        // Dispatch kept running: the session never wedged on itself.
        assert!(link.is_connected());
        link.shutdown();
    }

    #[tokio::test]
    async fn test_reconnects_after_close() {
        let (listener, url) = bind_server().await;
        let dashboard = Arc::new(Dashboard::new());
        let link = EngineLink::new(fast_options(&url), Arc::clone(&dashboard) as Arc<dyn Render>);
        link.connect().expect("spawn supervisor");

        let first = accept_client(&listener).await;
        wait_until(|| link.is_connected()).await;
        assert!(dashboard.is_online());

        drop(first);
        wait_until(|| !link.is_connected()).await;
        assert!(!dashboard.is_online());

        // Same listener, no intervention: the link dials again on its own.
        let _second = accept_client(&listener).await;
        wait_until(|| link.is_connected()).await;
        assert!(dashboard.is_online());

        link.shutdown();
    }

    #[tokio::test]
    async fn test_sends_during_outage_flush_on_reconnect() {
        let (listener, url) = bind_server().await;
        let link = EngineLink::new(fast_options(&url), Arc::new(NullRender));
        link.connect().expect("spawn supervisor");

        let first = accept_client(&listener).await;
        wait_until(|| link.is_connected()).await;
        drop(first);
        wait_until(|| !link.is_connected()).await;

        link.send_chat("while down").expect("queued");
        assert_eq!(link.pending_count(), 1);

        let mut second = accept_client(&listener).await;
        let envelope = next_envelope(&mut second).await;
        assert_eq!(envelope.kind, "Chat");
        assert_eq!(envelope.payload, json!({"message": "while down"}));

        link.shutdown();
    }

    #[tokio::test]
    async fn test_duplicate_connect_spawns_no_second_dial() {
        let (listener, url) = bind_server().await;
        let link = EngineLink::new(fast_options(&url), Arc::new(NullRender));

        link.connect().expect("first connect");
        link.connect().expect("second connect is a guarded no-op");

        let _server = accept_client(&listener).await;
        wait_until(|| link.is_connected()).await;

        // While the first session is alive, nobody else dials in.
        assert!(
            timeout(Duration::from_millis(300), listener.accept())
                .await
                .is_err()
        );

        link.shutdown();
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_endpoint() {
        let link = EngineLink::new(
            LinkOptions::new().with_endpoint("http://127.0.0.1:7878/ws"),
            Arc::new(NullRender),
        );
        let err = link.connect().expect_err("http endpoint must be rejected");
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_build_finished_failure_does_not_drop_connection() {
        let (listener, url) = bind_server().await;
        let dashboard = Arc::new(Dashboard::new());
        let link = EngineLink::new(fast_options(&url), Arc::clone(&dashboard) as Arc<dyn Render>);
        link.connect().expect("spawn supervisor");

        let mut server = accept_client(&listener).await;
        server
            .send(Message::text(
                r#"{"type":"BuildFinished","payload":{"success":false}}"#,
            ))
            .await
            .expect("push build result");

        wait_until(|| dashboard.build().is_finished()).await;
        assert!(!dashboard.build().succeeded());
        assert!(link.is_connected());

        // No reconnect was triggered by the failed build.
        assert!(
            timeout(Duration::from_millis(300), listener.accept())
                .await
                .is_err()
        );

        link.shutdown();
    }
}
