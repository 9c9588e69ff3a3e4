#![forbid(unsafe_code)]

//! Trailing-edge debouncing for keystroke-driven validity and action buttons.
//!
//! A [`Debouncer`] holds the latest pushed value and releases it once the
//! input has been quiet for the configured window. Rapid pushes inside the
//! window collapse into a single release carrying the last value.
//!
//! Time is passed in explicitly so behavior is deterministic under test.
//!
//! ```
//! use shelfkit_core::{Debouncer, Duration, Instant};
//!
//! let mut clicks = Debouncer::new(Duration::from_millis(500));
//! let t = Instant::now();
//! clicks.push((), t);
//! clicks.push((), t + Duration::from_millis(100));
//! clicks.push((), t + Duration::from_millis(200));
//! assert!(clicks.poll(t + Duration::from_millis(400)).is_none());
//! assert!(clicks.poll(t + Duration::from_millis(700)).is_some());
//! assert!(clicks.poll(t + Duration::from_millis(900)).is_none());
//! ```

use std::time::Duration;
use web_time::Instant;

/// Latest-value-wins trailing debouncer.
///
/// # Thread Safety
///
/// Not synchronized; owned by a single component on the UI thread.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
    coalesced: u64,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            deadline: None,
            coalesced: 0,
        }
    }

    /// The quiet window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a new value, restarting the quiet window.
    pub fn push(&mut self, value: T, now: Instant) {
        if self.pending.is_some() {
            self.coalesced += 1;
        }
        self.pending = Some(value);
        self.deadline = Some(now + self.window);
    }

    /// Release the pending value if the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Release the pending value immediately, ignoring the window.
    pub fn flush(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    /// Drop the pending value without releasing it.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending = None;
    }

    /// Whether a value is waiting for the window to elapse.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes releasable.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Total pushes that replaced an unreleased value.
    #[must_use]
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}
