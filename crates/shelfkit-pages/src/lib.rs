#![forbid(unsafe_code)]

//! Headless page controllers for inventory ordering and counting.
//!
//! # Role in shelfkit
//! A page parses its route segment into an [`AccessMode`](shelfkit_core::AccessMode),
//! asks the [`FormRegistry`](shelfkit_forms::FormRegistry) for its forms,
//! feeds the line array to a [`FormGrid`](shelfkit_grid::FormGrid) and talks
//! to persistence through the traits in [`services`]. Rendering is left to
//! the embedding UI; everything here is state and timing.
//!
//! # Timing contracts
//! - [`LoadingFlag`] is true exactly while a service call is in flight, and
//!   false again after success or error.
//! - [`SubmitGuard`] collapses a burst of button clicks into one call.
//! - [`BatchCloser`] sends close chunks strictly one after another.

pub mod batch;
pub mod error;
pub mod inventory_page;
pub mod loading;
pub mod order_page;
pub mod services;
pub mod submit;

pub use batch::{BatchCloser, BatchReport, ChunkSink};
pub use error::{PageError, PageResult, ServiceError};
pub use inventory_page::{PageAction, PhysicalInventoryPage, count_line_columns};
pub use loading::{LoadingFlag, LoadingGuard};
pub use order_page::{InventoryOrderPage, order_line_columns};
pub use services::{
    CountQuery, InventoryOrderService, LogNotifier, Notifier, PhysicalInventoryService,
};
pub use submit::SubmitGuard;
