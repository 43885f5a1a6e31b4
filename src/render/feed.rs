//! Rolling feeds for the high-volume panels.
//!
//! Log lines and Telegram messages arrive indefinitely; the panels only
//! ever show a window of the most recent ones. [`Feed`] keeps that
//! window: pushes beyond the cap silently evict the oldest entry.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

// ============================================================================
// Constants
// ============================================================================

/// Maximum retained log lines.
pub const LOG_FEED_CAP: usize = 100;

/// Maximum retained Telegram messages.
pub const TELEGRAM_FEED_CAP: usize = 20;

// ============================================================================
// Feed
// ============================================================================

/// Fixed-capacity rolling buffer, oldest first.
#[derive(Debug, Clone)]
pub struct Feed<T> {
    items: VecDeque<T>,
    cap: usize,
}

impl<T> Feed<T> {
    /// Creates an empty feed with the given capacity.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Appends an item, evicting the oldest when the feed is at
    /// capacity.
    pub fn push(&mut self, item: T) {
        if self.items.len() >= self.cap {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Returns the number of retained items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the feed is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the configured capacity.
    #[inline]
    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Iterates retained items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> Feed<T> {
    /// Clones out the retained items, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
