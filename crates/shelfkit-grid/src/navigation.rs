#![forbid(unsafe_code)]

//! Arrow-key cell navigation with wraparound and disabled-cell skipping.
//!
//! # Algorithm
//!
//! From the current cell, step one row (Up/Down) or one data column
//! (Left/Right), wrapping modulo the row or data-column count. Disabled cells
//! are skipped by stepping again in the same direction. The walk is bounded to
//! one lap: if no other enabled cell exists in that row or column the move is
//! a no-op.
//!
//! The selection column is not part of the matrix, so it never takes part in
//! the horizontal modulus.

use shelfkit_core::{KeyCode, KeyEvent};

use crate::matrix::{CellMatrix, CellPos};

/// Navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Direction for an arrow key; other keys map to `None`.
    #[must_use]
    pub const fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            KeyCode::Left => Some(Self::Left),
            KeyCode::Right => Some(Self::Right),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

/// Next enabled cell from `from` in `direction`, or `None` when the move is a
/// no-op (empty matrix, or every other cell on the line is disabled).
#[must_use]
pub fn navigate(matrix: &CellMatrix, from: CellPos, direction: Direction) -> Option<CellPos> {
    let len = if direction.is_vertical() {
        matrix.rows()
    } else {
        matrix.cols()
    };
    if len == 0 {
        return None;
    }
    let mut pos = from;
    for _ in 1..len {
        pos = step(pos, direction, len);
        if matrix.is_enabled(pos) {
            return Some(pos);
        }
    }
    None
}

fn step(pos: CellPos, direction: Direction, len: usize) -> CellPos {
    let back = |i: usize| (i % len + len - 1) % len;
    let forward = |i: usize| (i + 1) % len;
    match direction {
        Direction::Up => CellPos::new(back(pos.row), pos.col),
        Direction::Down => CellPos::new(forward(pos.row), pos.col),
        Direction::Left => CellPos::new(pos.row, back(pos.col)),
        Direction::Right => CellPos::new(pos.row, forward(pos.col)),
    }
}

/// What the host should do with a key press on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// Cell to focus next, if the key moved focus.
    pub target: Option<CellPos>,
    /// Suppress the key's default action and propagation.
    pub prevent_default: bool,
}

impl KeyOutcome {
    /// Let the key through untouched.
    pub const PASS: Self = Self {
        target: None,
        prevent_default: false,
    };
}

/// Handle a key press on the cell at `from`.
///
/// Arrow keys are consumed (even when the move is a no-op) unless the focused
/// input is an open dropdown, which keeps its own arrow handling. Arrows with
/// a modifier held (word jump, text selection) belong to the input.
#[must_use]
pub fn handle_key(
    matrix: &CellMatrix,
    from: CellPos,
    key: &KeyEvent,
    dropdown_open: bool,
) -> KeyOutcome {
    if !key.is_actionable() || !key.is_plain() || dropdown_open {
        return KeyOutcome::PASS;
    }
    let Some(direction) = Direction::from_key(key.code) else {
        return KeyOutcome::PASS;
    };
    let target = navigate(matrix, from, direction);
    tracing::trace!(?from, ?direction, ?target, "arrow navigation");
    KeyOutcome {
        target,
        prevent_default: true,
    }
}
