#![forbid(unsafe_code)]

//! Inventory order page.
//!
//! Loads one order, builds its form through the registry, shows the product
//! lines in a [`FormGrid`] and saves through an [`InventoryOrderService`].
//!
//! # Lifecycle
//!
//! ```text
//! new(route segment) ─► load(id) / open(order) ─► edits ─► click_save … poll ─► save
//!                                                                 │
//!                                                   destroy() ────┘ (pending click dropped)
//! ```
//!
//! A successful save in Add mode switches the page to Edit, the way the route
//! changes to the stored order's edit screen.

use rust_decimal::Decimal;
use shelfkit_core::{AccessMode, DestroySignal, EngineConfig, Instant};
use shelfkit_forms::entities::inventory_order::{
    InventoryOrder, InventoryOrderField, InventoryOrderProduct, InventoryOrderProductField,
};
use shelfkit_forms::{FieldKey, FormError, FormOptions, FormRegistry, ModelRef, TypedForm};
use shelfkit_grid::{ColumnDef, DisplayedColumns, FormGrid};

use crate::error::{PageError, PageResult};
use crate::loading::LoadingFlag;
use crate::services::{InventoryOrderService, Notifier};
use crate::submit::SubmitGuard;

pub const MSG_ORDER_SAVED: &str = "Order saved";
pub const MSG_ORDER_SAVE_FAILED: &str = "Unable to save order";
pub const MSG_ORDER_LOAD_FAILED: &str = "Unable to load order";

/// Product line columns, in default display order.
#[must_use]
pub fn order_line_columns() -> Vec<ColumnDef> {
    use InventoryOrderProductField as F;
    vec![
        ColumnDef::new(F::ProductCode.key(), "Product").sortable(),
        ColumnDef::new(F::Description.key(), "Description").sortable(),
        ColumnDef::new("uom", "UOM").field("uom.code"),
        ColumnDef::new(F::Quantity.key(), "Quantity").sortable(),
        ColumnDef::new(F::SuggestedQuantity.key(), "Suggested").sortable(),
        ColumnDef::new(F::MinimumOrderQuantity.key(), "Min Order"),
        ColumnDef::new(F::PackSize.key(), "Pack Size"),
        ColumnDef::new(F::UnitCost.key(), "Unit Cost").sortable(),
    ]
}

/// Headless controller for the order screen.
pub struct InventoryOrderPage<'r, S, N> {
    registry: &'r FormRegistry,
    service: S,
    notifier: N,
    config: EngineConfig,
    mode: AccessMode,
    destroy: DestroySignal,
    order: Option<InventoryOrder>,
    form: Option<TypedForm<InventoryOrderField>>,
    grid: FormGrid,
    loading: LoadingFlag,
    save_guard: SubmitGuard,
}

impl<'r, S: InventoryOrderService, N: Notifier> InventoryOrderPage<'r, S, N> {
    /// Open the page for a route segment (`view`, `edit`, `add`).
    ///
    /// An unknown segment fails immediately with
    /// `Unhandled Access Mode: <segment>`.
    pub fn new(
        registry: &'r FormRegistry,
        service: S,
        notifier: N,
        config: EngineConfig,
        route_segment: &str,
    ) -> PageResult<Self> {
        let mode = AccessMode::parse(route_segment)?;
        let destroy = DestroySignal::new();
        let columns = order_line_columns();
        let displayed = DisplayedColumns::new(columns.iter().map(|c| c.key.clone()));
        let grid = FormGrid::new(columns, displayed, &config, destroy.clone());
        Ok(Self {
            registry,
            service,
            notifier,
            save_guard: SubmitGuard::new(config.submit_debounce),
            config,
            mode,
            destroy,
            order: None,
            form: None,
            grid,
            loading: LoadingFlag::new(),
        })
    }

    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    #[must_use]
    pub fn order(&self) -> Option<&InventoryOrder> {
        self.order.as_ref()
    }

    #[must_use]
    pub fn form(&self) -> Option<&TypedForm<InventoryOrderField>> {
        self.form.as_ref()
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
    pub fn loading_flag(&self) -> &LoadingFlag {
        &self.loading
    }

    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    #[must_use]
    pub fn destroy_signal(&self) -> &DestroySignal {
        &self.destroy
    }

    fn options(&self) -> FormOptions {
        FormOptions::from_config(self.mode, &self.config)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Fetch an order and show it.
    pub fn load(&mut self, id: i64, now: Instant) -> PageResult<()> {
        self.ensure_alive()?;
        let _loading = self.loading.begin();
        let order = match self.service.load(id) {
            Ok(order) => order,
            Err(err) => {
                tracing::warn!(id, error = %err, "order load failed");
                self.notifier.error(MSG_ORDER_LOAD_FAILED);
                return Err(err.into());
            }
        };
        self.install(order, now)
    }

    /// Show an order already in hand, e.g. a new order in Add mode.
    pub fn open(&mut self, order: InventoryOrder, now: Instant) -> PageResult<()> {
        self.ensure_alive()?;
        self.install(order, now)
    }

    fn install(&mut self, order: InventoryOrder, now: Instant) -> PageResult<()> {
        let form = self.registry.group::<InventoryOrderField>(
            ModelRef::from(&order),
            &self.destroy,
            &self.options(),
        )?;
        self.grid
            .set_data_source(form.array(InventoryOrderField::InventoryOrderProducts)?, now);
        self.form = Some(form);
        self.order = Some(order);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// User edit of a line quantity.
    pub fn set_line_quantity(
        &mut self,
        row: usize,
        quantity: Option<Decimal>,
        now: Instant,
    ) -> PageResult<()> {
        let path = format!(
            "{}.{row}.{}",
            InventoryOrderField::InventoryOrderProducts.key(),
            InventoryOrderProductField::Quantity.key()
        );
        let form = self.form.as_mut().ok_or(PageError::NotLoaded)?;
        if form.form().control(&path)?.is_disabled() {
            return Err(PageError::ReadOnly);
        }
        form.patch_path(&path, quantity)?;
        self.grid
            .refresh(form.array(InventoryOrderField::InventoryOrderProducts)?, now);
        Ok(())
    }

    /// User edit of the order comments.
    pub fn set_comments(&mut self, comments: Option<String>) -> PageResult<()> {
        let form = self.form.as_mut().ok_or(PageError::NotLoaded)?;
        if form.control(InventoryOrderField::Comments)?.is_disabled() {
            return Err(PageError::ReadOnly);
        }
        form.set_control_value(InventoryOrderField::Comments, comments)?;
        Ok(())
    }

    /// Append a product line.
    pub fn add_line(&mut self, product: InventoryOrderProduct, now: Instant) -> PageResult<()> {
        if self.mode.is_view() {
            return Err(PageError::ReadOnly);
        }
        let options = self.options();
        let row = self.registry.build(ModelRef::from(&product), &options)?;
        let form = self.form.as_mut().ok_or(PageError::NotLoaded)?;
        let order = self.order.as_mut().ok_or(PageError::NotLoaded)?;
        form.array_mut(InventoryOrderField::InventoryOrderProducts)?
            .push(row);
        form.revalidate();
        order.inventory_order_products.push(product);
        self.grid
            .refresh(form.array(InventoryOrderField::InventoryOrderProducts)?, now);
        Ok(())
    }

    /// Drop a product line. Row indices shift, so the grid starts over.
    pub fn remove_line(&mut self, row: usize, now: Instant) -> PageResult<InventoryOrderProduct> {
        if self.mode.is_view() {
            return Err(PageError::ReadOnly);
        }
        let form = self.form.as_mut().ok_or(PageError::NotLoaded)?;
        let order = self.order.as_mut().ok_or(PageError::NotLoaded)?;
        let len = order.inventory_order_products.len();
        if row >= len {
            return Err(FormError::IndexOutOfRange {
                path: InventoryOrderField::InventoryOrderProducts.key().to_string(),
                index: row,
                len,
            }
            .into());
        }
        form.array_mut(InventoryOrderField::InventoryOrderProducts)?
            .remove_at(row);
        form.revalidate();
        let removed = order.inventory_order_products.remove(row);
        self.grid
            .set_data_source(form.array(InventoryOrderField::InventoryOrderProducts)?, now);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    /// Save button click. The save runs from [`poll`](Self::poll) once the
    /// click burst settles.
    pub fn click_save(&mut self, now: Instant) {
        if !self.destroy.is_fired() {
            self.save_guard.click(now);
        }
    }

    #[must_use]
    pub fn save_guard(&self) -> &SubmitGuard {
        &self.save_guard
    }

    /// Advance timers. Returns the save result when a debounced save ran.
    pub fn poll(&mut self, now: Instant) -> Option<PageResult<()>> {
        if self.destroy.is_fired() {
            return None;
        }
        self.grid.poll(now);
        self.save_guard.poll(now).then(|| self.save(now))
    }

    /// Validate, merge the form onto the model, persist and reload.
    pub fn save(&mut self, now: Instant) -> PageResult<()> {
        self.ensure_alive()?;
        if self.mode.is_view() {
            return Err(PageError::ReadOnly);
        }
        let form = self.form.as_mut().ok_or(PageError::NotLoaded)?;
        form.revalidate();
        if !form.is_valid() {
            let paths = form.invalid_paths();
            tracing::debug!(invalid = paths.len(), "order save blocked by validation");
            return Err(PageError::Invalid(paths));
        }
        let mut order = self.order.clone().ok_or(PageError::NotLoaded)?;
        order.merge_form(form.form())?;

        let _loading = self.loading.begin();
        match self.service.save(&order) {
            Ok(saved) => {
                tracing::debug!(id = ?saved.id, lines = saved.inventory_order_products.len(), "order saved");
                self.notifier.success(MSG_ORDER_SAVED);
                if self.mode.is_add() {
                    self.mode = AccessMode::Edit;
                }
                self.install(saved, now)
            }
            Err(err) => {
                tracing::warn!(id = ?order.id, error = %err, "order save failed");
                self.notifier.error(MSG_ORDER_SAVE_FAILED);
                Err(err.into())
            }
        }
    }

    /// Tear the page down. Pending clicks are dropped and the form stops
    /// accepting edits.
    pub fn destroy(&mut self) {
        self.save_guard.cancel();
        if self.destroy.fire() {
            tracing::debug!("order page destroyed");
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

impl<S, N> std::fmt::Debug for InventoryOrderPage<'_, S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryOrderPage")
            .field("mode", &self.mode)
            .field("order_id", &self.order.as_ref().and_then(|o| o.id))
            .field("loading", &self.loading.is_loading())
            .field("destroyed", &self.destroy.is_fired())
            .finish()
    }
}
