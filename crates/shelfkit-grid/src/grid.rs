#![forbid(unsafe_code)]

//! The form-backed grid controller.
//!
//! [`FormGrid`] ties a line-item [`FormArray`] to the cell matrix, the
//! selection model, the sort state and the per-cell validity watchers. It
//! never mutates the form: it reads statuses on [`refresh`](FormGrid::refresh)
//! and reports what changed through [`GridEvent`]s.
//!
//! # Data source lifecycle
//!
//! | Call | Matrix | Selection | Focus |
//! |------|--------|-----------|-------|
//! | [`set_data_source`](FormGrid::set_data_source) | rebuilt | cleared | cleared |
//! | [`set_displayed_columns`](FormGrid::set_displayed_columns) | rebuilt | kept | follows its column |
//! | [`refresh`](FormGrid::refresh) | states updated | unselectable rows dropped | kept |
//!
//! Validity watchers are fresh after a data source swap. The other rebuilds
//! carry each watcher over to its cell's new position, keyed by row and
//! column key, so a transition still inside its window is not lost.

use std::collections::BTreeMap;

use shelfkit_core::{DestroySignal, Duration, EngineConfig, Instant, KeyEvent};
use shelfkit_forms::{ControlStatus, FormArray};

use crate::columns::{ColumnDef, DisplayedColumns};
use crate::matrix::{CellMatrix, CellPos, CellState, cell_state};
use crate::navigation::{Direction, KeyOutcome, handle_key};
use crate::selection::SelectionModel;
use crate::sort::{GridSort, SortChange};
use crate::validity::{CellValidityWatcher, ValidityChange};

/// Notifications for the owning page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// A sortable header was clicked.
    SortChange(SortChange),
    /// An arrow key was handled on a cell.
    ArrowPressed {
        from: CellPos,
        direction: Direction,
        target: Option<CellPos>,
    },
    /// A cell settled into a different validity.
    UpdateValidity(ValidityChange),
}

/// Grid over one line-item form array.
#[derive(Debug)]
pub struct FormGrid {
    defs: Vec<ColumnDef>,
    displayed: DisplayedColumns,
    matrix: CellMatrix,
    selection: SelectionModel<usize>,
    selectable: Vec<bool>,
    sort: GridSort,
    generation: u64,
    focus: Option<CellPos>,
    watchers: BTreeMap<CellPos, CellValidityWatcher>,
    validity_window: Duration,
    destroy: DestroySignal,
    events: Vec<GridEvent>,
}

impl FormGrid {
    #[must_use]
    pub fn new(
        defs: Vec<ColumnDef>,
        displayed: DisplayedColumns,
        config: &EngineConfig,
        destroy: DestroySignal,
    ) -> Self {
        Self {
            defs,
            displayed,
            matrix: CellMatrix::default(),
            selection: SelectionModel::new(true),
            selectable: Vec::new(),
            sort: GridSort::new(),
            generation: 0,
            focus: None,
            watchers: BTreeMap::new(),
            validity_window: config.validity_debounce,
            destroy,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Data source
    // ------------------------------------------------------------------

    /// Replace the data source: new search, category, location or page.
    /// Returns the new generation.
    pub fn set_data_source(&mut self, rows: &FormArray, now: Instant) -> u64 {
        self.generation += 1;
        if !self.selection.is_empty() {
            tracing::debug!(
                generation = self.generation,
                cleared = self.selection.len(),
                "data source replaced; selection cleared"
            );
        }
        self.selection.clear();
        self.focus = None;
        self.watchers.clear();
        self.rebuild(rows, now);
        self.generation
    }

    /// Change the displayed columns. Selection survives; focus follows its
    /// column if it is still shown.
    pub fn set_displayed_columns(&mut self, displayed: DisplayedColumns, rows: &FormArray, now: Instant) {
        let focused_key = self
            .focus
            .and_then(|pos| self.matrix.column_key(pos.col).map(|k| (pos.row, k.to_string())));
        self.displayed = displayed;
        self.rebuild(rows, now);
        self.focus = focused_key.and_then(|(row, key)| {
            self.displayed
                .position(&key)
                .map(|col| CellPos::new(row, col))
                .filter(|pos| self.matrix.is_enabled(*pos))
        });
    }

    /// Re-read statuses after edits. Rebuilds if the row count changed.
    pub fn refresh(&mut self, rows: &FormArray, now: Instant) {
        if self.matrix.needs_rebuild(rows.len(), &self.displayed) {
            self.rebuild(rows, now);
            return;
        }
        for (pos, _) in self.matrix.clone().iter() {
            let state = self.read_state(rows, pos);
            if !self.matrix.set_state(pos, state) {
                continue;
            }
            if let Some(watcher) = self.watchers.get_mut(&pos) {
                watcher.observe(state_status(state), now);
            }
        }
        self.update_selectable(rows);
        if self.focus.is_some_and(|pos| !self.matrix.is_enabled(pos)) {
            self.focus = None;
        }
    }

    fn rebuild(&mut self, rows: &FormArray, now: Instant) {
        let mut carried: BTreeMap<(usize, String), CellValidityWatcher> = BTreeMap::new();
        for (pos, watcher) in std::mem::take(&mut self.watchers) {
            if let Some(key) = self.matrix.column_key(pos.col) {
                carried.insert((pos.row, key.to_string()), watcher);
            }
        }
        self.matrix = CellMatrix::from_form(rows, &self.displayed, &self.defs);
        let mut watchers = BTreeMap::new();
        for (pos, state) in self.matrix.iter() {
            let status = state_status(state);
            let key = self.matrix.column_key(pos.col).map(str::to_string);
            let previous = key.and_then(|key| carried.remove(&(pos.row, key)));
            let watcher = match previous {
                Some(mut watcher) => {
                    watcher.relocate(pos);
                    watcher.observe(status, now);
                    watcher
                }
                None => CellValidityWatcher::new(
                    pos,
                    status,
                    self.validity_window,
                    self.destroy.clone(),
                ),
            };
            watchers.insert(pos, watcher);
        }
        if !carried.is_empty() {
            tracing::trace!(dropped = carried.len(), "validity watchers dropped on rebuild");
        }
        self.watchers = watchers;
        self.update_selectable(rows);
    }

    fn read_state(&self, rows: &FormArray, pos: CellPos) -> CellState {
        let Some(key) = self.matrix.column_key(pos.col) else {
            return CellState::Disabled;
        };
        let field = self
            .defs
            .iter()
            .find(|def| def.key == key)
            .map_or(key, |def| def.field.as_str());
        rows.at(pos.row)
            .map_or(CellState::Disabled, |node| cell_state(node, field))
    }

    fn update_selectable(&mut self, rows: &FormArray) {
        self.selectable = rows
            .iter()
            .map(|row| row.status() == ControlStatus::Valid)
            .collect();
        let selectable = &self.selectable;
        let dropped = self
            .selection
            .retain(|row| selectable.get(*row).copied().unwrap_or(false));
        if dropped > 0 {
            tracing::debug!(dropped, "unselectable rows removed from selection");
        }
    }

    /// Settle validity watchers and queue their transitions.
    pub fn poll(&mut self, now: Instant) {
        for watcher in self.watchers.values_mut() {
            if let Some(change) = watcher.poll(now) {
                self.events.push(GridEvent::UpdateValidity(change));
            }
        }
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Focus and keys
    // ------------------------------------------------------------------

    #[must_use]
    pub fn focus(&self) -> Option<CellPos> {
        self.focus
    }

    /// Focus a cell. Disabled cells refuse focus.
    pub fn set_focus(&mut self, pos: CellPos) -> bool {
        if self.matrix.is_enabled(pos) {
            self.focus = Some(pos);
            true
        } else {
            false
        }
    }

    /// Route a key press to the focused cell.
    pub fn on_key(&mut self, key: &KeyEvent, dropdown_open: bool) -> KeyOutcome {
        let Some(from) = self.focus else {
            return KeyOutcome::PASS;
        };
        let outcome = handle_key(&self.matrix, from, key, dropdown_open);
        if outcome.prevent_default {
            if let Some(direction) = Direction::from_key(key.code) {
                self.events.push(GridEvent::ArrowPressed {
                    from,
                    direction,
                    target: outcome.target,
                });
            }
            if let Some(target) = outcome.target {
                self.focus = Some(target);
            }
        }
        outcome
    }

    // ------------------------------------------------------------------
    // Sort
    // ------------------------------------------------------------------

    /// Header click. Non-sortable or unknown columns are ignored.
    pub fn on_header_click(&mut self, column: &str) -> Option<SortChange> {
        let sortable = self.defs.iter().any(|def| def.key == column && def.sortable);
        if !sortable {
            return None;
        }
        let change = self.sort.cycle(column);
        self.events.push(GridEvent::SortChange(change.clone()));
        Some(change)
    }

    #[must_use]
    pub fn sort(&self) -> &GridSort {
        &self.sort
    }

    /// Row indices in display order under the active sort.
    #[must_use]
    pub fn sorted_rows(&self, rows: &FormArray) -> Vec<usize> {
        let field = self.sort.active().map_or("", |(key, _)| {
            self.defs
                .iter()
                .find(|def| def.key == key)
                .map_or(key, |def| def.field.as_str())
        });
        self.sort.order(rows, field)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Enabled and valid rows.
    #[must_use]
    pub fn selectable_rows(&self) -> Vec<usize> {
        self.selectable
            .iter()
            .enumerate()
            .filter_map(|(row, ok)| ok.then_some(row))
            .collect()
    }

    #[must_use]
    pub fn is_row_selectable(&self, row: usize) -> bool {
        self.selectable.get(row).copied().unwrap_or(false)
    }

    /// Select a row; unselectable rows are refused.
    pub fn select_row(&mut self, row: usize) -> bool {
        self.is_row_selectable(row) && self.selection.select(row)
    }

    pub fn deselect_row(&mut self, row: usize) -> bool {
        self.selection.deselect(&row)
    }

    /// Toggle a row's checkbox. Returns whether it is now selected.
    pub fn toggle_row(&mut self, row: usize) -> bool {
        if self.selection.is_selected(&row) {
            self.selection.deselect(&row);
            false
        } else {
            self.select_row(row)
        }
    }

    /// Header checkbox.
    pub fn master_toggle(&mut self) {
        let selectable = self.selectable_rows();
        self.selection.master_toggle(&selectable);
    }

    #[must_use]
    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected(&self.selectable_rows())
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionModel<usize> {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn matrix(&self) -> &CellMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn displayed(&self) -> &DisplayedColumns {
        &self.displayed
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.defs
    }

    /// Bumped on every data source swap.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn state_status(state: CellState) -> ControlStatus {
    match state {
        CellState::EnabledValid => ControlStatus::Valid,
        CellState::EnabledInvalid => ControlStatus::Invalid,
        CellState::Disabled => ControlStatus::Disabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfkit_core::KeyCode;
    use shelfkit_forms::validation::Min;
    use shelfkit_forms::{FormControl, FormGroup, FormNode};
    use rust_decimal::Decimal;

    fn row(qty: i64, enabled: bool) -> FormNode {
        let mut quantity = FormControl::new(qty).with_validator(Min::new(Decimal::ZERO));
        if !enabled {
            quantity.disable();
        }
        let mut group = FormGroup::new()
            .with("code", FormControl::new(format!("SKU-{qty}")).disabled())
            .with("quantity", quantity);
        group.validate();
        FormNode::Group(group)
    }

    fn grid() -> FormGrid {
        FormGrid::new(
            vec![
                ColumnDef::new("code", "Code").sortable(),
                ColumnDef::new("quantity", "Qty").sortable(),
            ],
            DisplayedColumns::with_select(["code", "quantity"]),
            &EngineConfig::default(),
            DestroySignal::new(),
        )
    }

    #[test]
    fn data_source_swap_clears_selection() {
        let rows = FormArray::new(vec![row(1, true), row(2, true)]);
        let mut grid = grid();
        let t0 = Instant::now();
        assert_eq!(grid.set_data_source(&rows, t0), 1);
        assert!(grid.select_row(0));
        assert!(grid.set_focus(CellPos::new(0, 1)));

        assert_eq!(grid.set_data_source(&rows, t0), 2);
        assert!(grid.selection().is_empty());
        assert_eq!(grid.focus(), None);
    }

    #[test]
    fn column_reorder_keeps_selection_and_focus() {
        let rows = FormArray::new(vec![row(1, true), row(2, true)]);
        let mut grid = grid();
        let t0 = Instant::now();
        grid.set_data_source(&rows, t0);
        grid.select_row(1);
        grid.set_focus(CellPos::new(1, 1));

        grid.set_displayed_columns(DisplayedColumns::with_select(["quantity", "code"]), &rows, t0);
        assert!(grid.selection().is_selected(&1));
        assert_eq!(grid.focus(), Some(CellPos::new(1, 0)));
    }

    #[test]
    fn disabled_and_invalid_rows_unselectable() {
        let rows = FormArray::new(vec![row(1, true), row(2, false), row(-1, true)]);
        let mut grid = grid();
        grid.set_data_source(&rows, Instant::now());
        assert_eq!(grid.selectable_rows(), vec![0]);
        assert!(!grid.select_row(1));
        assert!(!grid.select_row(2));
        grid.master_toggle();
        assert!(grid.is_all_selected());
        assert_eq!(grid.selection().selected(), vec![0]);
    }

    #[test]
    fn row_turning_invalid_leaves_selection() {
        let mut rows = FormArray::new(vec![row(1, true), row(2, true)]);
        let mut grid = grid();
        let t0 = Instant::now();
        grid.set_data_source(&rows, t0);
        grid.master_toggle();
        rows.group_at_mut(1).unwrap().patch_value("quantity", -5i64).unwrap();
        grid.refresh(&rows, t0);
        assert_eq!(grid.selection().selected(), vec![0]);
        assert!(grid.is_all_selected());
    }

    #[test]
    fn validity_events_are_debounced() {
        let mut rows = FormArray::new(vec![row(1, true)]);
        let mut grid = grid();
        let t0 = Instant::now();
        grid.set_data_source(&rows, t0);

        let quantity = |rows: &mut FormArray, q: i64| {
            rows.group_at_mut(0).unwrap().patch_value("quantity", q).unwrap();
        };
        quantity(&mut rows, -1);
        grid.refresh(&rows, t0);
        quantity(&mut rows, 1);
        grid.refresh(&rows, t0 + Duration::from_millis(50));
        quantity(&mut rows, -2);
        grid.refresh(&rows, t0 + Duration::from_millis(100));

        grid.poll(t0 + Duration::from_millis(150));
        assert!(grid.drain_events().is_empty());

        grid.poll(t0 + Duration::from_millis(400));
        assert_eq!(
            grid.drain_events(),
            vec![GridEvent::UpdateValidity(ValidityChange {
                pos: CellPos::new(0, 1),
                valid: false,
            })]
        );
    }

    #[test]
    fn other_rows_edits_do_not_delay_validity() {
        let mut rows = FormArray::new(vec![row(1, true), row(2, true)]);
        let mut grid = grid();
        let t0 = Instant::now();
        grid.set_data_source(&rows, t0);

        rows.group_at_mut(0).unwrap().patch_value("quantity", -1i64).unwrap();
        grid.refresh(&rows, t0);

        let mut events = Vec::new();
        for step in 1..=10u64 {
            let q = if step % 2 == 0 { 3i64 } else { -3 };
            rows.group_at_mut(1).unwrap().patch_value("quantity", q).unwrap();
            let now = t0 + Duration::from_millis(150 * step);
            grid.refresh(&rows, now);
            grid.poll(now);
            events.extend(grid.drain_events());
        }
        assert!(events.contains(&GridEvent::UpdateValidity(ValidityChange {
            pos: CellPos::new(0, 1),
            valid: false,
        })));
    }

    #[test]
    fn column_reorder_keeps_pending_validity() {
        let mut rows = FormArray::new(vec![row(1, true)]);
        let mut grid = grid();
        let t0 = Instant::now();
        grid.set_data_source(&rows, t0);

        rows.group_at_mut(0).unwrap().patch_value("quantity", -1i64).unwrap();
        grid.refresh(&rows, t0);
        grid.set_displayed_columns(
            DisplayedColumns::with_select(["quantity", "code"]),
            &rows,
            t0 + Duration::from_millis(100),
        );
        grid.poll(t0 + Duration::from_millis(150));
        assert!(grid.drain_events().is_empty());

        grid.poll(t0 + Duration::from_millis(250));
        assert_eq!(
            grid.drain_events(),
            vec![GridEvent::UpdateValidity(ValidityChange {
                pos: CellPos::new(0, 0),
                valid: false,
            })]
        );
    }

    #[test]
    fn added_row_keeps_pending_validity() {
        let mut rows = FormArray::new(vec![row(1, true)]);
        let mut grid = grid();
        let t0 = Instant::now();
        grid.set_data_source(&rows, t0);

        rows.group_at_mut(0).unwrap().patch_value("quantity", -1i64).unwrap();
        grid.refresh(&rows, t0);
        rows.push(row(2, true));
        grid.refresh(&rows, t0 + Duration::from_millis(100));
        assert_eq!(grid.matrix().rows(), 2);

        grid.poll(t0 + Duration::from_millis(250));
        assert_eq!(
            grid.drain_events(),
            vec![GridEvent::UpdateValidity(ValidityChange {
                pos: CellPos::new(0, 1),
                valid: false,
            })]
        );
    }

    #[test]
    fn arrows_move_focus_and_emit() {
        let rows = FormArray::new(vec![row(1, true), row(2, false), row(3, true)]);
        let mut grid = grid();
        grid.set_data_source(&rows, Instant::now());
        grid.set_focus(CellPos::new(2, 1));

        let outcome = grid.on_key(&KeyEvent::new(KeyCode::Up), false);
        assert_eq!(outcome.target, Some(CellPos::new(0, 1)));
        assert_eq!(grid.focus(), Some(CellPos::new(0, 1)));
        assert!(matches!(
            grid.drain_events().as_slice(),
            [GridEvent::ArrowPressed {
                direction: Direction::Up,
                ..
            }]
        ));

        let outcome = grid.on_key(&KeyEvent::new(KeyCode::Up), true);
        assert_eq!(outcome, KeyOutcome::PASS);
        assert!(grid.drain_events().is_empty());
    }

    #[test]
    fn header_click_cycles_sort() {
        let rows = FormArray::new(vec![row(3, true), row(1, true), row(2, true)]);
        let mut grid = grid();
        grid.set_data_source(&rows, Instant::now());
        assert!(grid.on_header_click("unknown").is_none());
        grid.on_header_click("quantity");
        assert_eq!(grid.sorted_rows(&rows), vec![1, 2, 0]);
        assert_eq!(grid.drain_events().len(), 1);
    }
}
