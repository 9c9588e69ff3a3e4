#![forbid(unsafe_code)]

//! Physical inventory counting page.
//!
//! The header form shows the inventory; the count lines come from searches
//! (category, location) and live in their own line array so a new search can
//! replace them without touching the header.
//!
//! # Counting by location
//!
//! With a counting location set, each line's `actualCount` edits that
//! location's entry in `countsByLocation` and `totalQuantity` follows the sum
//! of all locations. Switching location archives the current counts and
//! rebuilds the lines for the new location.
//!
//! # Closing
//!
//! Selected lines close in fixed-size chunks, one request at a time. A chunk's
//! `actualCount` cells lock while its request is in flight. A failed chunk is
//! unlocked again and later chunks are not sent.

use rust_decimal::Decimal;
use shelfkit_core::{AccessMode, DestroySignal, EngineConfig, Instant};
use shelfkit_forms::entities::physical_inventory::{
    CountStatus, PhysicalInventory, PhysicalInventoryCount, PhysicalInventoryCountField,
    PhysicalInventoryField, archive_actual_count,
};
use shelfkit_forms::{
    FieldKey, FormError, FormOptions, FormRegistry, ModelRef, TypedForm, TypedFormArray,
};
use shelfkit_grid::{ColumnDef, DisplayedColumns, FormGrid};

use crate::batch::{BatchCloser, BatchReport, ChunkSink};
use crate::error::{PageError, PageResult, ServiceError};
use crate::loading::LoadingFlag;
use crate::services::{CountQuery, Notifier, PhysicalInventoryService};
use crate::submit::SubmitGuard;

pub const MSG_COUNTS_SAVED: &str = "Counts saved";
pub const MSG_COUNTS_SAVE_FAILED: &str = "Unable to save counts";
pub const MSG_COUNTS_CLOSED: &str = "Counts closed";
pub const MSG_COUNTS_CLOSE_FAILED: &str = "Unable to close counts";
pub const MSG_INVENTORY_LOAD_FAILED: &str = "Unable to load inventory";
pub const MSG_COUNTS_SEARCH_FAILED: &str = "Unable to search counts";

/// Count line columns, in default display order.
#[must_use]
pub fn count_line_columns() -> Vec<ColumnDef> {
    use PhysicalInventoryCountField as F;
    vec![
        ColumnDef::new(F::ProductCode.key(), "Product").sortable(),
        ColumnDef::new(F::Description.key(), "Description").sortable(),
        ColumnDef::new(F::Category.key(), "Category").sortable(),
        ColumnDef::new("uom", "UOM").field("uom.code"),
        ColumnDef::new(F::ActualCount.key(), "Count").sortable(),
        ColumnDef::new(F::TotalQuantity.key(), "Total").sortable(),
        ColumnDef::new(F::Status.key(), "Status"),
    ]
}

/// What a debounced button released during [`PhysicalInventoryPage::poll`].
#[derive(Debug)]
pub enum PageAction {
    Save(PageResult<()>),
    Close(PageResult<BatchReport<usize>>),
}

/// Headless controller for the counting screen.
pub struct PhysicalInventoryPage<'r, S, N> {
    registry: &'r FormRegistry,
    service: S,
    notifier: N,
    config: EngineConfig,
    mode: AccessMode,
    destroy: DestroySignal,
    inventory: Option<PhysicalInventory>,
    header: Option<TypedForm<PhysicalInventoryField>>,
    counts: Vec<PhysicalInventoryCount>,
    lines: Option<TypedFormArray<PhysicalInventoryCountField>>,
    query: CountQuery,
    location: Option<String>,
    grid: FormGrid,
    loading: LoadingFlag,
    save_guard: SubmitGuard,
    close_guard: SubmitGuard,
    last_close: Option<BatchReport<usize>>,
}

impl<'r, S: PhysicalInventoryService, N: Notifier> PhysicalInventoryPage<'r, S, N> {
    /// Open the page for a route segment (`view`, `edit`, `add`).
    pub fn new(
        registry: &'r FormRegistry,
        service: S,
        notifier: N,
        config: EngineConfig,
        route_segment: &str,
    ) -> PageResult<Self> {
        let mode = AccessMode::parse(route_segment)?;
        let destroy = DestroySignal::new();
        let columns = count_line_columns();
        let displayed = DisplayedColumns::with_select(columns.iter().map(|c| c.key.clone()));
        let grid = FormGrid::new(columns, displayed, &config, destroy.clone());
        Ok(Self {
            registry,
            service,
            notifier,
            save_guard: SubmitGuard::new(config.submit_debounce),
            close_guard: SubmitGuard::new(config.submit_debounce),
            config,
            mode,
            destroy,
            inventory: None,
            header: None,
            counts: Vec::new(),
            lines: None,
            query: CountQuery::default(),
            location: None,
            grid,
            loading: LoadingFlag::new(),
            last_close: None,
        })
    }

    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    #[must_use]
    pub fn inventory(&self) -> Option<&PhysicalInventory> {
        self.inventory.as_ref()
    }

    #[must_use]
    pub fn header(&self) -> Option<&TypedForm<PhysicalInventoryField>> {
        self.header.as_ref()
    }

    /// Count models of the current search, as last loaded or saved.
    #[must_use]
    pub fn counts(&self) -> &[PhysicalInventoryCount] {
        &self.counts
    }

    #[must_use]
    pub fn lines(&self) -> Option<&TypedFormArray<PhysicalInventoryCountField>> {
        self.lines.as_ref()
    }

    #[must_use]
    pub fn query(&self) -> &CountQuery {
        &self.query
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    #[must_use]
    pub fn grid(&self) -> &FormGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut FormGrid {
        &mut self.grid
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Outcome of the most recent close run.
    #[must_use]
    pub fn last_close_report(&self) -> Option<&BatchReport<usize>> {
        self.last_close.as_ref()
    }

    fn options(&self) -> FormOptions {
        let options = FormOptions::from_config(self.mode, &self.config);
        match &self.location {
            Some(location) => options.counting_by_location(location.as_str()),
            None => options,
        }
    }

    fn inventory_id(&self) -> PageResult<i64> {
        self.inventory
            .as_ref()
            .and_then(|inventory| inventory.id)
            .ok_or(PageError::NotLoaded)
    }

    // ------------------------------------------------------------------
    // Loading and searching
    // ------------------------------------------------------------------

    /// Fetch the inventory header and run the current search.
    pub fn load(&mut self, id: i64, now: Instant) -> PageResult<()> {
        self.ensure_alive()?;
        let _loading = self.loading.begin();
        let inventory = match self.service.load(id) {
            Ok(inventory) => inventory,
            Err(err) => {
                tracing::warn!(id, error = %err, "inventory load failed");
                self.notifier.error(MSG_INVENTORY_LOAD_FAILED);
                return Err(err.into());
            }
        };
        let header_model = PhysicalInventory {
            physical_inventory_counts: Vec::new(),
            ..inventory.clone()
        };
        let header = self.registry.group::<PhysicalInventoryField>(
            ModelRef::from(&header_model),
            &self.destroy,
            &self.options(),
        )?;
        self.header = Some(header);
        self.inventory = Some(inventory);
        let query = self.query.clone();
        self.fetch_counts(query, now)
    }

    /// New category/location search. Replaces the lines and clears the
    /// selection.
    pub fn search(&mut self, query: CountQuery, now: Instant) -> PageResult<()> {
        self.ensure_alive()?;
        let _loading = self.loading.begin();
        self.fetch_counts(query, now)
    }

    fn fetch_counts(&mut self, query: CountQuery, now: Instant) -> PageResult<()> {
        let inventory_id = self.inventory_id()?;
        match self.service.search_counts(inventory_id, &query) {
            Ok(counts) => {
                tracing::debug!(
                    inventory_id,
                    category = ?query.category,
                    location = ?query.location,
                    found = counts.len(),
                    "counts searched"
                );
                self.query = query;
                self.counts = counts;
                self.rebuild_lines(now)
            }
            Err(err) => {
                tracing::warn!(inventory_id, error = %err, "count search failed");
                self.notifier.error(MSG_COUNTS_SEARCH_FAILED);
                Err(err.into())
            }
        }
    }

    fn rebuild_lines(&mut self, now: Instant) -> PageResult<()> {
        let lines = self.registry.array::<PhysicalInventoryCountField>(
            self.counts.iter().map(ModelRef::from),
            &self.destroy,
            &self.options(),
        )?;
        self.grid.set_data_source(lines.array(), now);
        self.lines = Some(lines);
        Ok(())
    }

    /// Copy every line form back onto its count model.
    fn merge_lines(&mut self) -> PageResult<()> {
        let lines = self.lines.as_ref().ok_or(PageError::NotLoaded)?;
        for (index, count) in self.counts.iter_mut().enumerate() {
            count.merge_form(lines.row(index)?)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Counting
    // ------------------------------------------------------------------

    /// Count by location from now on, editing `location`. Counts entered for
    /// the previous location are archived first.
    pub fn switch_location(&mut self, location: impl Into<String>, now: Instant) -> PageResult<()> {
        self.ensure_alive()?;
        let location = location.into();
        if self.lines.is_some() {
            self.merge_lines()?;
        }
        tracing::debug!(from = ?self.location, to = %location, "counting location switched");
        self.location = Some(location);
        if self.lines.is_some() {
            self.rebuild_lines(now)?;
        }
        Ok(())
    }

    /// Stop counting by location. The archived per-location counts stay.
    pub fn clear_location(&mut self, now: Instant) -> PageResult<()> {
        self.ensure_alive()?;
        if self.location.is_none() {
            return Ok(());
        }
        if self.lines.is_some() {
            self.merge_lines()?;
        }
        self.location = None;
        if self.lines.is_some() {
            self.rebuild_lines(now)?;
        }
        Ok(())
    }

    /// User edit of a line's count. Returns the line's new total.
    pub fn set_actual_count(
        &mut self,
        row: usize,
        count: Option<Decimal>,
        now: Instant,
    ) -> PageResult<Decimal> {
        use PhysicalInventoryCountField as F;

        let options = self.options();
        let lines = self.lines.as_mut().ok_or(PageError::NotLoaded)?;
        if lines.row_control(row, F::ActualCount)?.is_disabled() {
            return Err(PageError::ReadOnly);
        }
        lines.patch_row_value(row, F::ActualCount, count)?;
        let total = if options.counting_by_location {
            archive_actual_count(lines.row_mut(row)?, self.registry, &options)?
        } else {
            let total = count.unwrap_or_default();
            lines.patch_row_value(row, F::TotalQuantity, total)?;
            total
        };
        lines.revalidate();
        self.grid.refresh(lines.array(), now);
        Ok(total)
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    pub fn click_save(&mut self, now: Instant) {
        if !self.destroy.is_fired() {
            self.save_guard.click(now);
        }
    }

    /// Validate, merge and persist the current lines.
    pub fn save_counts(&mut self, now: Instant) -> PageResult<()> {
        self.ensure_alive()?;
        if !self.mode.is_edit() {
            return Err(PageError::ReadOnly);
        }
        let inventory_id = self.inventory_id()?;
        let lines = self.lines.as_mut().ok_or(PageError::NotLoaded)?;
        lines.revalidate();
        if lines.status().is_invalid() {
            let paths = lines.array().iter().enumerate().flat_map(|(index, node)| {
                node.as_group()
                    .map(|row| {
                        row.invalid_paths()
                            .into_iter()
                            .map(|path| format!("{index}.{path}"))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            });
            return Err(PageError::Invalid(paths.collect()));
        }
        self.merge_lines()?;

        let _loading = self.loading.begin();
        match self.service.save_counts(inventory_id, &self.counts) {
            Ok(saved) => {
                tracing::debug!(inventory_id, saved = saved.len(), "counts saved");
                self.notifier.success(MSG_COUNTS_SAVED);
                self.counts = saved;
                self.rebuild_lines(now)
            }
            Err(err) => {
                tracing::warn!(inventory_id, error = %err, "count save failed");
                self.notifier.error(MSG_COUNTS_SAVE_FAILED);
                Err(err.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Close
    // ------------------------------------------------------------------

    pub fn click_close(&mut self, now: Instant) {
        if !self.destroy.is_fired() {
            self.close_guard.click(now);
        }
    }

    /// Close the selected lines in sequential chunks of
    /// [`EngineConfig::close_batch_size`].
    ///
    /// On failure the report stays available from
    /// [`last_close_report`](Self::last_close_report).
    pub fn close_selected(&mut self, now: Instant) -> PageResult<BatchReport<usize>> {
        self.ensure_alive()?;
        if !self.mode.is_edit() {
            return Err(PageError::ReadOnly);
        }
        let inventory_id = self.inventory_id()?;
        let lines = self.lines.as_mut().ok_or(PageError::NotLoaded)?;

        let (rows, unsaved): (Vec<usize>, Vec<usize>) = self
            .grid
            .selection()
            .iter()
            .copied()
            .partition(|&row| self.counts.get(row).and_then(|c| c.id).is_some());
        if !unsaved.is_empty() {
            tracing::warn!(rows = ?unsaved, "selected counts have no id; left pending");
        }

        let _loading = self.loading.begin();
        let mut sink = CloseSink {
            inventory_id,
            service: &mut self.service,
            counts: &mut self.counts,
            lines,
            grid: &mut self.grid,
            now,
        };
        let mut report = BatchCloser::from_config(&self.config).run(&rows, &mut sink);
        report.pending.extend(unsaved);
        report.pending.sort_unstable();
        self.last_close = Some(report.clone());

        match &report.error {
            None => {
                if !rows.is_empty() {
                    self.notifier.success(MSG_COUNTS_CLOSED);
                }
                Ok(report)
            }
            Some(err) => {
                self.notifier.error(MSG_COUNTS_CLOSE_FAILED);
                Err(err.clone().into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Timers and teardown
    // ------------------------------------------------------------------

    /// Advance timers and run any debounced action whose window passed.
    pub fn poll(&mut self, now: Instant) -> Vec<PageAction> {
        if self.destroy.is_fired() {
            return Vec::new();
        }
        self.grid.poll(now);
        let mut fired = Vec::new();
        if self.save_guard.poll(now) {
            fired.push(PageAction::Save(self.save_counts(now)));
        }
        if self.close_guard.poll(now) {
            fired.push(PageAction::Close(self.close_selected(now)));
        }
        fired
    }

    pub fn destroy(&mut self) {
        self.save_guard.cancel();
        self.close_guard.cancel();
        if self.destroy.fire() {
            tracing::debug!("inventory page destroyed");
        }
    }

    fn ensure_alive(&self) -> PageResult<()> {
        if self.destroy.is_fired() {
            Err(FormError::Destroyed.into())
        } else {
            Ok(())
        }
    }
}

impl<S, N> std::fmt::Debug for PhysicalInventoryPage<'_, S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalInventoryPage")
            .field("mode", &self.mode)
            .field("inventory_id", &self.inventory.as_ref().and_then(|i| i.id))
            .field("counts", &self.counts.len())
            .field("location", &self.location)
            .field("loading", &self.loading.is_loading())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Close sink
// ---------------------------------------------------------------------------

struct CloseSink<'a, S> {
    inventory_id: i64,
    service: &'a mut S,
    counts: &'a mut Vec<PhysicalInventoryCount>,
    lines: &'a mut TypedFormArray<PhysicalInventoryCountField>,
    grid: &'a mut FormGrid,
    now: Instant,
}

impl<S> CloseSink<'_, S> {
    fn set_locked(&mut self, rows: &[usize], locked: bool) {
        for &row in rows {
            let Ok(group) = self.lines.row_mut(row) else {
                continue;
            };
            if let Ok(control) = group.control_mut(PhysicalInventoryCountField::ActualCount.key()) {
                if locked {
                    control.disable();
                } else {
                    control.enable();
                }
            }
        }
        self.lines.revalidate();
    }
}

impl<S: PhysicalInventoryService> ChunkSink<usize> for CloseSink<'_, S> {
    fn begin(&mut self, chunk: &[usize]) {
        self.set_locked(chunk, true);
    }

    fn close(&mut self, chunk: &[usize]) -> Result<(), ServiceError> {
        let ids: Vec<i64> = chunk
            .iter()
            .filter_map(|&row| self.counts.get(row).and_then(|c| c.id))
            .collect();
        self.service.close_counts(self.inventory_id, &ids)
    }

    fn closed(&mut self, chunk: &[usize]) {
        for &row in chunk {
            if let Some(count) = self.counts.get_mut(row) {
                count.status = CountStatus::Closed;
            }
            if let Err(err) = self.lines.patch_row_value(
                row,
                PhysicalInventoryCountField::Status,
                CountStatus::Closed.code(),
            ) {
                tracing::warn!(row, error = %err, "closed count not reflected in form");
            }
        }
        self.grid.refresh(self.lines.array(), self.now);
    }

    fn failed(&mut self, chunk: &[usize], _error: &ServiceError) {
        self.set_locked(chunk, false);
        self.grid.refresh(self.lines.array(), self.now);
    }
}
