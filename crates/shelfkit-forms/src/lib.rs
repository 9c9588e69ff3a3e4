#![forbid(unsafe_code)]

//! Forms: the dynamic form registry, form trees, validators and the built-in
//! inventory entities.
//!
//! # Role in shelfkit
//! `shelfkit-forms` turns domain models into access-mode-aware form trees.
//! Pages ask a [`FormRegistry`] for a form by entity; the registry looks up
//! the entity's creator, which builds the tree (recursing into the registry
//! for line items), applies the entity's disable table for the current
//! [`AccessMode`](shelfkit_core::AccessMode), and attaches validators.
//!
//! # How it fits in the system
//! The grid crate reads and patches the arrays built here; the pages crate
//! owns one [`TypedForm`] per page and ties it to the page's
//! [`DestroySignal`](shelfkit_core::DestroySignal).
//!
//! # Example
//!
//! ```rust
//! use shelfkit_core::{AccessMode, DestroySignal};
//! use shelfkit_forms::entities::inventory_order::{InventoryOrder, InventoryOrderField};
//! use shelfkit_forms::{FormOptions, FormRegistry};
//!
//! let registry = FormRegistry::with_defaults();
//! let order = InventoryOrder::default();
//! let form = registry
//!     .group::<InventoryOrderField>(
//!         (&order).into(),
//!         &DestroySignal::new(),
//!         &FormOptions::new(AccessMode::Edit),
//!     )
//!     .unwrap();
//! assert!(form.control(InventoryOrderField::Store).unwrap().is_disabled());
//! assert!(form.control(InventoryOrderField::Comments).unwrap().is_enabled());
//! ```

pub mod control;
pub mod entities;
pub mod error;
pub mod registry;
pub mod typed;
pub mod validation;
pub mod value;

pub use control::{ControlStatus, FormArray, FormControl, FormGroup, FormNode};
pub use error::{FormError, FormResult};
pub use registry::{EntityKind, EntityModel, FormCreator, FormOptions, FormRegistry, ModelRef};
pub use typed::{FieldKey, TypedForm, TypedFormArray, ValueChange};
pub use value::FormValue;
