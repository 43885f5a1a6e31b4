//! Event handler registry.
//!
//! Maps event kinds to ordered handler lists. Handlers are the open half
//! of dispatch: any number may be registered per kind, they all run in
//! registration order, and there is no unregistration. The closed half,
//! the built-in [`Render`](crate::render::Render) call, is selected
//! separately in the session loop; both paths run for every matching
//! event.
//!
//! Handlers are reference-counted so the session loop can snapshot a
//! kind's list and invoke the callbacks with no registry lock held. A
//! handler is therefore free to register further handlers; those take
//! effect from the next event.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;

// ============================================================================
// Types
// ============================================================================

/// Event handler callback type.
///
/// Called with the raw envelope payload for each matching inbound event.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

// ============================================================================
// HandlerRegistry
// ============================================================================

/// Registry of user handlers keyed by event kind.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: FxHashMap<String, Vec<EventHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for an event kind.
    ///
    /// Handlers accumulate: registering twice for the same kind runs
    /// both, in registration order.
    pub fn register(&mut self, kind: impl Into<String>, handler: EventHandler) {
        self.handlers.entry(kind.into()).or_default().push(handler);
    }

    /// Returns the handlers registered for `kind`, in registration
    /// order. Kinds with no handlers yield an empty list.
    ///
    /// The returned handles are clones; callers invoke them after
    /// releasing whatever lock guards the registry.
    #[must_use]
    pub fn handlers_for(&self, kind: &str) -> Vec<EventHandler> {
        self.handlers.get(kind).cloned().unwrap_or_default()
    }

    /// Returns the number of handlers registered for `kind`.
    #[inline]
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.handlers.get(kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: FxHashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (kind.as_str(), handlers.len()))
            .collect();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &counts)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
