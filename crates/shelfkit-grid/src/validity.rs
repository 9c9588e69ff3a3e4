#![forbid(unsafe_code)]

//! Debounced per-cell validity notifications.
//!
//! A keystroke can flip a control between valid and invalid several times in
//! quick succession. Each cell feeds its control's status into a
//! [`CellValidityWatcher`], which settles on the latest status after the quiet
//! window and reports only real transitions.
//!
//! # Invariants
//!
//! 1. At most one [`ValidityChange`] per settled window.
//! 2. A change is reported only when the settled validity differs from the
//!    last reported one.
//! 3. Nothing is reported after the destroy signal fires.
//! 4. Repeating the status already seen does not restart the window.

use shelfkit_core::{Debouncer, DestroySignal, Duration, Instant};
use shelfkit_forms::ControlStatus;

use crate::matrix::CellPos;

/// A settled validity transition of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidityChange {
    pub pos: CellPos,
    pub valid: bool,
}

/// Watches one cell's control status.
#[derive(Debug)]
pub struct CellValidityWatcher {
    pos: CellPos,
    valid: bool,
    seen: bool,
    debouncer: Debouncer<bool>,
    destroy: DestroySignal,
}

impl CellValidityWatcher {
    /// Start watching with the control's current status. Disabled counts as
    /// valid: it never blocks the row.
    #[must_use]
    pub fn new(pos: CellPos, status: ControlStatus, window: Duration, destroy: DestroySignal) -> Self {
        let valid = !status.is_invalid();
        Self {
            pos,
            valid,
            seen: valid,
            debouncer: Debouncer::new(window),
            destroy,
        }
    }

    #[must_use]
    pub fn pos(&self) -> CellPos {
        self.pos
    }

    /// Last reported validity.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Move the watcher to a new cell position after a matrix rebuild. The
    /// reported validity and any pending transition come along.
    pub fn relocate(&mut self, pos: CellPos) {
        self.pos = pos;
    }

    /// Feed a status change.
    pub fn observe(&mut self, status: ControlStatus, now: Instant) {
        if self.destroy.is_fired() {
            return;
        }
        let valid = !status.is_invalid();
        if valid == self.seen {
            return;
        }
        self.seen = valid;
        self.debouncer.push(valid, now);
    }

    /// Report a settled transition, if any.
    pub fn poll(&mut self, now: Instant) -> Option<ValidityChange> {
        if self.destroy.is_fired() {
            self.debouncer.cancel();
            return None;
        }
        let settled = self.debouncer.poll(now)?;
        self.seen = settled;
        if settled == self.valid {
            return None;
        }
        self.valid = settled;
        Some(ValidityChange {
            pos: self.pos,
            valid: settled,
        })
    }
}
