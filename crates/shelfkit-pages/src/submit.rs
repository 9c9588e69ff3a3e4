#![forbid(unsafe_code)]

//! Debounced action buttons.
//!
//! A [`SubmitGuard`] turns any burst of clicks into one action: each click
//! restarts the quiet window, and the action fires once the window passes
//! without another click. Three clicks inside the window produce exactly one
//! outbound call.

use shelfkit_core::{Debouncer, Duration, Instant};

/// Trailing-edge click debouncer for save/close/generate buttons.
#[derive(Debug, Clone)]
pub struct SubmitGuard {
    clicks: Debouncer<()>,
    fired: u64,
}

impl SubmitGuard {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            clicks: Debouncer::new(window),
            fired: 0,
        }
    }

    /// Record a click.
    pub fn click(&mut self, now: Instant) {
        self.clicks.push((), now);
    }

    /// `true` exactly once per settled burst of clicks.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.clicks.poll(now).is_some() {
            self.fired += 1;
            true
        } else {
            false
        }
    }

    /// A click is waiting for its window.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.clicks.is_pending()
    }

    /// Drop a pending click (e.g. on page destroy).
    pub fn cancel(&mut self) {
        self.clicks.cancel();
    }

    /// Clicks absorbed into a later one.
    #[must_use]
    pub fn suppressed(&self) -> u64 {
        self.clicks.coalesced_count()
    }

    /// Actions released so far.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[test]
    fn burst_fires_once() {
        let mut guard = SubmitGuard::new(WINDOW);
        let t0 = Instant::now();
        guard.click(t0);
        guard.click(t0 + Duration::from_millis(100));
        guard.click(t0 + Duration::from_millis(200));
        assert!(!guard.poll(t0 + Duration::from_millis(600)));
        assert!(guard.poll(t0 + Duration::from_millis(700)));
        assert!(!guard.poll(t0 + Duration::from_millis(2_000)));
        assert_eq!(guard.fired(), 1);
        assert_eq!(guard.suppressed(), 2);
    }

    #[test]
    fn separate_bursts_fire_separately() {
        let mut guard = SubmitGuard::new(WINDOW);
        let t0 = Instant::now();
        guard.click(t0);
        assert!(guard.poll(t0 + WINDOW));
        guard.click(t0 + WINDOW * 2);
        assert!(guard.poll(t0 + WINDOW * 3));
        assert_eq!(guard.fired(), 2);
    }

    #[test]
    fn cancel_drops_click() {
        let mut guard = SubmitGuard::new(WINDOW);
        let t0 = Instant::now();
        guard.click(t0);
        guard.cancel();
        assert!(!guard.is_pending());
        assert!(!guard.poll(t0 + WINDOW));
    }
}
