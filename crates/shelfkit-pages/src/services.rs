#![forbid(unsafe_code)]

//! Collaborators the pages call out to.
//!
//! Persistence, search and user notification live outside shelfkit. Pages
//! reach them through these traits and own one implementation of each.

use shelfkit_forms::entities::inventory_order::InventoryOrder;
use shelfkit_forms::entities::physical_inventory::{PhysicalInventory, PhysicalInventoryCount};

use crate::error::ServiceError;

/// Persistence facade for inventory orders.
pub trait InventoryOrderService {
    fn load(&mut self, id: i64) -> Result<InventoryOrder, ServiceError>;

    /// Persist `order` and return the stored version.
    fn save(&mut self, order: &InventoryOrder) -> Result<InventoryOrder, ServiceError>;
}

/// Filter for a count search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountQuery {
    pub category: Option<String>,
    pub location: Option<String>,
}

impl CountQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Persistence and search facade for physical inventories.
pub trait PhysicalInventoryService {
    fn load(&mut self, id: i64) -> Result<PhysicalInventory, ServiceError>;

    fn search_counts(
        &mut self,
        inventory_id: i64,
        query: &CountQuery,
    ) -> Result<Vec<PhysicalInventoryCount>, ServiceError>;

    /// Persist edited counts and return the stored versions.
    fn save_counts(
        &mut self,
        inventory_id: i64,
        counts: &[PhysicalInventoryCount],
    ) -> Result<Vec<PhysicalInventoryCount>, ServiceError>;

    /// Close the counts with these ids.
    fn close_counts(&mut self, inventory_id: i64, count_ids: &[i64]) -> Result<(), ServiceError>;
}

/// User-facing toast messages.
pub trait Notifier {
    fn success(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&mut self, message: &str) {
        tracing::info!(message, "notify success");
    }

    fn error(&mut self, message: &str) {
        tracing::warn!(message, "notify error");
    }
}
