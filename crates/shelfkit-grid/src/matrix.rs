#![forbid(unsafe_code)]

//! The cell matrix: one entry per (row, displayed data column).
//!
//! Cells register in whatever order they render. [`CellMatrix::build`] sorts
//! them into the current displayed-column order before indexing, so column
//! indices always match what the user sees.

use shelfkit_forms::{ControlStatus, FormArray, FormNode};

use crate::columns::{ColumnDef, DisplayedColumns};

/// A cell coordinate. `col` indexes data columns only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Per-cell state, read from the backing control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    EnabledValid,
    EnabledInvalid,
    #[default]
    Disabled,
}

impl CellState {
    #[must_use]
    pub const fn from_status(status: ControlStatus) -> Self {
        match status {
            ControlStatus::Valid => Self::EnabledValid,
            ControlStatus::Invalid => Self::EnabledInvalid,
            ControlStatus::Disabled => Self::Disabled,
        }
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    #[must_use]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::EnabledInvalid)
    }
}

/// A cell announcing itself during render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRegistration {
    pub row: usize,
    pub column: String,
    pub state: CellState,
}

impl CellRegistration {
    #[must_use]
    pub fn new(row: usize, column: impl Into<String>, state: CellState) -> Self {
        Self {
            row,
            column: column.into(),
            state,
        }
    }
}

/// `rows × data columns` grid of cell states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellMatrix {
    columns: Vec<String>,
    cells: Vec<Vec<CellState>>,
}

impl CellMatrix {
    /// Index registered cells by (row, displayed column).
    ///
    /// Unregistered positions are disabled. Cells for hidden columns or rows
    /// past `rows` are dropped.
    #[must_use]
    pub fn build(
        rows: usize,
        displayed: &DisplayedColumns,
        cells: impl IntoIterator<Item = CellRegistration>,
    ) -> Self {
        let columns = displayed.data_keys().to_vec();
        let mut indexed: Vec<(usize, usize, CellState)> = cells
            .into_iter()
            .filter(|cell| cell.row < rows)
            .filter_map(|cell| {
                displayed
                    .position(&cell.column)
                    .map(|col| (cell.row, col, cell.state))
            })
            .collect();
        indexed.sort_by_key(|&(row, col, _)| (row, col));

        let mut matrix = vec![vec![CellState::Disabled; columns.len()]; rows];
        for (row, col, state) in indexed {
            matrix[row][col] = state;
        }
        tracing::trace!(rows, columns = columns.len(), "cell matrix built");
        Self {
            columns,
            cells: matrix,
        }
    }

    /// Matrix over a line-item array: each row group's control at the
    /// column's field path decides the cell state.
    #[must_use]
    pub fn from_form(array: &FormArray, displayed: &DisplayedColumns, defs: &[ColumnDef]) -> Self {
        let registrations = array.iter().enumerate().flat_map(|(row, node)| {
            displayed.data_keys().iter().map(move |key| {
                let field = defs
                    .iter()
                    .find(|def| &def.key == key)
                    .map_or(key.as_str(), |def| def.field.as_str());
                let state = cell_state(node, field);
                CellRegistration::new(row, key.as_str(), state)
            })
        });
        Self::build(array.len(), displayed, registrations)
    }

    /// Whether the matrix is stale for this row count and column order.
    #[must_use]
    pub fn needs_rebuild(&self, rows: usize, displayed: &DisplayedColumns) -> bool {
        self.cells.len() != rows || self.columns.as_slice() != displayed.data_keys()
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column_key(&self, col: usize) -> Option<&str> {
        self.columns.get(col).map(String::as_str)
    }

    /// State at `pos`; out-of-range positions read as disabled.
    #[must_use]
    pub fn state(&self, pos: CellPos) -> CellState {
        self.cells
            .get(pos.row)
            .and_then(|row| row.get(pos.col))
            .copied()
            .unwrap_or(CellState::Disabled)
    }

    #[must_use]
    pub fn is_enabled(&self, pos: CellPos) -> bool {
        self.state(pos).is_enabled()
    }

    /// Update one cell. Returns `true` if the state changed.
    pub fn set_state(&mut self, pos: CellPos, state: CellState) -> bool {
        match self.cells.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
            Some(cell) if *cell != state => {
                *cell = state;
                true
            }
            _ => false,
        }
    }

    /// Row-major iteration over every cell.
    pub fn iter(&self) -> impl Iterator<Item = (CellPos, CellState)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, state)| (CellPos::new(row, col), *state))
        })
    }
}

/// Cell state for `field` in a row node. Bare-control rows back every column.
pub(crate) fn cell_state(row: &FormNode, field: &str) -> CellState {
    let node = match row {
        FormNode::Group(group) => group.get(field),
        other => Some(other),
    };
    node.map_or(CellState::Disabled, |node| CellState::from_status(node.status()))
}
