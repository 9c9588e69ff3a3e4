#![forbid(unsafe_code)]

//! shelfkit public facade crate.
//!
//! Re-exports the form registry, the grid engine and the page controllers
//! under one roof, with a prelude for day-to-day use.
//!
//! # Example
//!
//! ```rust
//! use shelfkit::prelude::*;
//! use shelfkit::forms::entities::physical_inventory::{CountLocation, PhysicalInventoryCount};
//!
//! let registry = FormRegistry::with_defaults();
//! let count = PhysicalInventoryCount {
//!     counts_by_location: vec![
//!         CountLocation::new("BAY", 10.into()),
//!         CountLocation::new("DISPLAY", 15.into()),
//!     ],
//!     ..Default::default()
//! };
//! let options = FormOptions::new(AccessMode::Edit).counting_by_location("DISPLAY");
//! let form = registry.build(ModelRef::from(&count), &options)?;
//! assert_eq!(form.control("totalQuantity")?.value().as_decimal(), Some(25.into()));
//! assert_eq!(form.control("actualCount")?.value().as_decimal(), Some(15.into()));
//! # Ok::<(), shelfkit::Error>(())
//! ```

use std::fmt;

#[cfg(feature = "logging")]
pub mod logging;

// --- Core re-exports -------------------------------------------------------

pub use shelfkit_core::{
    AccessMode, AccessModeError, ConfigError, Debouncer, DestroySignal, Duration, EngineConfig,
    Instant, KeyCode, KeyEvent, KeyEventKind, Modifiers,
};

// --- Form re-exports -------------------------------------------------------

pub use shelfkit_forms::{
    ControlStatus, EntityKind, FieldKey, FormArray, FormControl, FormCreator, FormError,
    FormGroup, FormNode, FormOptions, FormRegistry, FormValue, ModelRef, TypedForm,
    TypedFormArray,
};

// --- Grid re-exports -------------------------------------------------------

pub use shelfkit_grid::{
    CellMatrix, CellPos, ColumnDef, Direction, DisplayedColumns, FormGrid, GridEvent, GridSort,
    SelectionModel, SortDirection,
};

// --- Page re-exports -------------------------------------------------------

#[cfg(feature = "pages")]
pub use shelfkit_pages::{
    BatchCloser, CountQuery, InventoryOrderPage, InventoryOrderService, LoadingFlag, Notifier,
    PageError, PhysicalInventoryPage, PhysicalInventoryService, ServiceError, SubmitGuard,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for shelfkit apps.
#[derive(Debug)]
pub enum Error {
    /// Unrecognized route segment.
    AccessMode(AccessModeError),
    /// Invalid engine configuration.
    Config(ConfigError),
    /// Form construction or addressing failure.
    Form(FormError),
    /// Page operation failure.
    #[cfg(feature = "pages")]
    Page(PageError),
    /// Logging pipeline could not be installed.
    Logging(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessMode(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Form(err) => write!(f, "{err}"),
            #[cfg(feature = "pages")]
            Self::Page(err) => write!(f, "{err}"),
            Self::Logging(msg) => write!(f, "logging: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AccessMode(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Form(err) => Some(err),
            #[cfg(feature = "pages")]
            Self::Page(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<AccessModeError> for Error {
    fn from(err: AccessModeError) -> Self {
        Self::AccessMode(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<FormError> for Error {
    fn from(err: FormError) -> Self {
        Self::Form(err)
    }
}

#[cfg(feature = "pages")]
impl From<PageError> for Error {
    fn from(err: PageError) -> Self {
        Self::Page(err)
    }
}

/// Standard result type for shelfkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AccessMode, DestroySignal, EngineConfig, Error, FieldKey, FormGrid, FormOptions,
        FormRegistry, Instant, ModelRef, Result, TypedForm,
    };

    #[cfg(feature = "pages")]
    pub use crate::{InventoryOrderPage, Notifier, PhysicalInventoryPage};

    pub use crate::{core, forms, grid};
}

pub use shelfkit_core as core;
pub use shelfkit_forms as forms;
pub use shelfkit_grid as grid;
#[cfg(feature = "pages")]
pub use shelfkit_pages as pages;
