//! Rendering: the [`Render`] seam and the reference [`Dashboard`].
//!
//! The link does not draw anything itself. It calls exactly one
//! [`Render`] method per recognized inbound event, and the renderer
//! decides what that means: update a TUI panel, push to a web socket,
//! or nothing at all.
//!
//! | Type | Role |
//! |------|------|
//! | [`Render`] | Trait with one no-op-default method per event kind |
//! | [`Dashboard`] | Folds events into drawable panel state |
//! | [`Feed`] | Rolling window for the log and Telegram panels |
//! | [`NullRender`] | Draws nothing; for headless links |

// ============================================================================
// Submodules
// ============================================================================

/// The reference dashboard renderer.
pub mod dashboard;

/// Rolling feeds for high-volume panels.
pub mod feed;

/// The renderer trait.
pub mod render;

// ============================================================================
// Re-exports
// ============================================================================

pub use dashboard::{BuildPanel, ChatEntry, Dashboard, LoadLevel, MetricsView};
pub use feed::{Feed, LOG_FEED_CAP, TELEGRAM_FEED_CAP};
pub use render::{NullRender, Render};
