#![forbid(unsafe_code)]

//! Grid: the keyboard-navigable, selection-aware view over a line-item form
//! array.
//!
//! # Role in shelfkit
//! Pages hand the grid the [`FormArray`](shelfkit_forms::FormArray) built by
//! the form registry. The grid derives a cell matrix from per-field
//! enablement, moves focus with the arrow keys (wrapping, skipping disabled
//! cells), tracks which rows are selected, and reports debounced validity
//! transitions so the page re-renders once per settled change.
//!
//! # Example
//!
//! ```rust
//! use shelfkit_grid::{CellMatrix, CellPos, CellRegistration, CellState, Direction, DisplayedColumns, navigate};
//!
//! let displayed = DisplayedColumns::with_select(["quantity"]);
//! let cells = [
//!     CellRegistration::new(0, "quantity", CellState::EnabledValid),
//!     CellRegistration::new(1, "quantity", CellState::Disabled),
//!     CellRegistration::new(2, "quantity", CellState::EnabledValid),
//! ];
//! let matrix = CellMatrix::build(3, &displayed, cells);
//! assert_eq!(
//!     navigate(&matrix, CellPos::new(2, 0), Direction::Up),
//!     Some(CellPos::new(0, 0))
//! );
//! ```

pub mod columns;
pub mod grid;
pub mod matrix;
pub mod navigation;
pub mod selection;
pub mod sort;
pub mod validity;

pub use columns::{ColumnDef, DisplayedColumns, SELECT_COLUMN};
pub use grid::{FormGrid, GridEvent};
pub use matrix::{CellMatrix, CellPos, CellRegistration, CellState};
pub use navigation::{Direction, KeyOutcome, handle_key, navigate};
pub use selection::SelectionModel;
pub use sort::{GridSort, SortChange, SortDirection};
pub use validity::{CellValidityWatcher, ValidityChange};
