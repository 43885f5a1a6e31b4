//! Pending outbound frame queue.
//!
//! Frames that cannot be handed to an open transport are parked here in
//! FIFO order and flushed the moment the connection comes (back) up.
//! The queue is unbounded by default, matching the original client; an
//! optional limit with an explicit [`OverflowPolicy`] is available
//! because an unbounded queue under prolonged disconnection is a
//! memory-growth risk.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use crate::error::{Error, Result};

// ============================================================================
// OverflowPolicy
// ============================================================================

/// What a bounded [`PendingQueue`] does with a new frame when full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Drop the oldest queued frame to make room.
    #[default]
    EvictOldest,
    /// Refuse the new frame and surface [`Error::QueueFull`].
    RejectNewest,
}

// ============================================================================
// PendingQueue
// ============================================================================

/// FIFO buffer of serialized outbound frames.
#[derive(Debug)]
pub struct PendingQueue {
    frames: VecDeque<String>,
    limit: Option<usize>,
    overflow: OverflowPolicy,
}

impl PendingQueue {
    /// Creates an empty queue with the given bound and overflow policy.
    ///
    /// `limit: None` means unbounded.
    #[must_use]
    pub fn new(limit: Option<usize>, overflow: OverflowPolicy) -> Self {
        Self {
            frames: VecDeque::new(),
            limit,
            overflow,
        }
    }

    /// Appends a frame at the back of the queue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`] when the queue is bounded with
    /// [`OverflowPolicy::RejectNewest`] and already at its limit. With
    /// [`OverflowPolicy::EvictOldest`] the head frame is dropped instead
    /// and the push succeeds.
    pub fn push(&mut self, frame: String) -> Result<()> {
        if let Some(limit) = self.limit
            && self.frames.len() >= limit
        {
            match self.overflow {
                OverflowPolicy::EvictOldest => {
                    self.frames.pop_front();
                    tracing::warn!(limit, "pending queue full, evicted oldest frame");
                }
                OverflowPolicy::RejectNewest => {
                    return Err(Error::queue_full(limit));
                }
            }
        }

        self.frames.push_back(frame);
        Ok(())
    }

    /// Puts a frame back at the front of the queue.
    ///
    /// Used when a flush fails mid-way so the unsent frame keeps its
    /// original position. Bypasses the limit: a frame that was already
    /// accepted is never dropped on re-queue.
    pub fn push_front(&mut self, frame: String) {
        self.frames.push_front(frame);
    }

    /// Removes and returns the oldest frame.
    pub fn pop_front(&mut self) -> Option<String> {
        self.frames.pop_front()
    }

    /// Returns the number of queued frames.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if no frames are queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the oldest queued frame without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.frames.front().map(String::as_str)
    }
}

// ============================================================================
// Tests
// ============================================================================
