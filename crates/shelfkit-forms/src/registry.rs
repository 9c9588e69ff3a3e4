#![forbid(unsafe_code)]

//! The dynamic form registry.
//!
//! A [`FormRegistry`] maps each [`EntityKind`] to a [`FormCreator`] that turns
//! a model plus [`FormOptions`] into a validated, access-mode-aware form tree.
//! The registry is an explicit service: build it once at bootstrap
//! (usually with [`FormRegistry::with_defaults`]) and hand a reference to every
//! page that needs forms. Nothing about it is global.
//!
//! Creators compose one-to-many relationships by calling back into the
//! registry for the child entity ([`FormRegistry::build_array`]).
//!
//! # Failure Modes
//!
//! | Scenario | Behavior |
//! |----------|----------|
//! | Entity never registered | `Err(FormError::NotRegistered)` |
//! | Unknown entity name | `Err(FormError::NotRegistered)` |
//! | Model of another entity | `Err(FormError::ModelMismatch)` |
//! | Typed field missing from built tree | `Err(FormError::MissingControl)` |
//! | Re-registering an entity | previous creator returned, warning logged |

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use shelfkit_core::config::DEFAULT_DECIMAL_SCALE;
use shelfkit_core::{AccessMode, DestroySignal, EngineConfig};

use crate::control::{FormArray, FormGroup, FormNode};
use crate::entities::inventory_order::{InventoryOrder, InventoryOrderProduct};
use crate::entities::physical_inventory::{CountLocation, PhysicalInventory, PhysicalInventoryCount};
use crate::error::{FormError, FormResult};
use crate::typed::{FieldKey, TypedForm, TypedFormArray};

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The closed set of entities the registry can build forms for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    InventoryOrder,
    InventoryOrderProduct,
    PhysicalInventory,
    PhysicalInventoryCount,
    CountLocation,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::InventoryOrder,
        EntityKind::InventoryOrderProduct,
        EntityKind::PhysicalInventory,
        EntityKind::PhysicalInventoryCount,
        EntityKind::CountLocation,
    ];

    /// Registry name of the entity.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InventoryOrder => "InventoryOrder",
            Self::InventoryOrderProduct => "InventoryOrderProduct",
            Self::PhysicalInventory => "PhysicalInventory",
            Self::PhysicalInventoryCount => "PhysicalInventoryCount",
            Self::CountLocation => "CountLocation",
        }
    }

    /// Look up an entity by registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// A borrowed model of any registered entity.
#[derive(Debug, Clone, Copy)]
pub enum ModelRef<'a> {
    InventoryOrder(&'a InventoryOrder),
    InventoryOrderProduct(&'a InventoryOrderProduct),
    PhysicalInventory(&'a PhysicalInventory),
    PhysicalInventoryCount(&'a PhysicalInventoryCount),
    CountLocation(&'a CountLocation),
}

impl<'a> ModelRef<'a> {
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::InventoryOrder(_) => EntityKind::InventoryOrder,
            Self::InventoryOrderProduct(_) => EntityKind::InventoryOrderProduct,
            Self::PhysicalInventory(_) => EntityKind::PhysicalInventory,
            Self::PhysicalInventoryCount(_) => EntityKind::PhysicalInventoryCount,
            Self::CountLocation(_) => EntityKind::CountLocation,
        }
    }

    /// Borrow the concrete model, or fail with a mismatch.
    pub fn downcast<M: EntityModel>(self) -> FormResult<&'a M> {
        M::from_ref(self).ok_or(FormError::ModelMismatch {
            expected: M::KIND,
            found: self.kind(),
        })
    }
}

/// A domain record the registry can build a form for.
pub trait EntityModel: Sized + 'static {
    const KIND: EntityKind;

    fn from_ref(model: ModelRef<'_>) -> Option<&Self>;

    fn as_model_ref(&self) -> ModelRef<'_>;
}

macro_rules! entity_model {
    ($ty:ident) => {
        impl EntityModel for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn from_ref(model: ModelRef<'_>) -> Option<&Self> {
                match model {
                    ModelRef::$ty(m) => Some(m),
                    _ => None,
                }
            }

            fn as_model_ref(&self) -> ModelRef<'_> {
                ModelRef::$ty(self)
            }
        }

        impl<'a> From<&'a $ty> for ModelRef<'a> {
            fn from(model: &'a $ty) -> Self {
                ModelRef::$ty(model)
            }
        }
    };
}

entity_model!(InventoryOrder);
entity_model!(InventoryOrderProduct);
entity_model!(PhysicalInventory);
entity_model!(PhysicalInventoryCount);
entity_model!(CountLocation);

// ---------------------------------------------------------------------------
// FormOptions
// ---------------------------------------------------------------------------

/// Context handed to every creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    /// How the page was opened.
    pub access_mode: AccessMode,
    /// Counts are entered per location rather than as one total.
    pub counting_by_location: bool,
    /// The location whose count is edited as `actualCount`.
    pub current_location: Option<String>,
    /// Fractional digits accepted for non-EACH quantities.
    pub decimal_scale: u32,
}

impl FormOptions {
    #[must_use]
    pub fn new(access_mode: AccessMode) -> Self {
        Self {
            access_mode,
            counting_by_location: false,
            current_location: None,
            decimal_scale: DEFAULT_DECIMAL_SCALE,
        }
    }

    /// Options carrying the configured decimal scale.
    #[must_use]
    pub fn from_config(access_mode: AccessMode, config: &EngineConfig) -> Self {
        Self::new(access_mode).with_decimal_scale(config.decimal_scale)
    }

    /// Count by location, editing `location`.
    #[must_use]
    pub fn counting_by_location(mut self, location: impl Into<String>) -> Self {
        self.counting_by_location = true;
        self.current_location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_decimal_scale(mut self, scale: u32) -> Self {
        self.decimal_scale = scale;
        self
    }
}

// ---------------------------------------------------------------------------
// FormCreator
// ---------------------------------------------------------------------------

/// Builds the form tree for one entity.
///
/// Implementations must be pure functions of `(model, options)`; they may call
/// back into `registry` to build nested arrays of other entities.
pub trait FormCreator: Send + Sync {
    fn create(
        &self,
        registry: &FormRegistry,
        model: ModelRef<'_>,
        options: &FormOptions,
    ) -> FormResult<FormGroup>;
}

impl<F> FormCreator for F
where
    F: Fn(&FormRegistry, ModelRef<'_>, &FormOptions) -> FormResult<FormGroup> + Send + Sync,
{
    fn create(
        &self,
        registry: &FormRegistry,
        model: ModelRef<'_>,
        options: &FormOptions,
    ) -> FormResult<FormGroup> {
        self(registry, model, options)
    }
}

// ---------------------------------------------------------------------------
// FormRegistry
// ---------------------------------------------------------------------------

/// Entity → creator map, built once at bootstrap.
#[derive(Clone, Default)]
pub struct FormRegistry {
    creators: HashMap<EntityKind, Arc<dyn FormCreator>>,
}

impl FormRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in entity creator.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::entities::register_defaults(&mut registry);
        registry
    }

    /// Register a creator. The last registration wins; the replaced creator is
    /// returned so callers that care can treat overwrite as an error.
    pub fn register(
        &mut self,
        kind: EntityKind,
        creator: impl FormCreator + 'static,
    ) -> Option<Arc<dyn FormCreator>> {
        let previous = self.creators.insert(kind, Arc::new(creator));
        if previous.is_some() {
            tracing::warn!(entity = %kind, "form creator re-registered; previous creator replaced");
        } else {
            tracing::debug!(entity = %kind, "form creator registered");
        }
        previous
    }

    #[must_use]
    pub fn is_registered(&self, kind: EntityKind) -> bool {
        self.creators.contains_key(&kind)
    }

    /// Registered entities, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<EntityKind> {
        let mut kinds: Vec<_> = self.creators.keys().copied().collect();
        kinds.sort();
        kinds
    }

    fn creator(&self, kind: EntityKind) -> FormResult<&Arc<dyn FormCreator>> {
        self.creators
            .get(&kind)
            .ok_or_else(|| FormError::NotRegistered(kind.name().to_string()))
    }

    /// Build and validate the untyped tree for `model`.
    pub fn build(&self, model: ModelRef<'_>, options: &FormOptions) -> FormResult<FormGroup> {
        let kind = model.kind();
        let creator = self.creator(kind)?;
        let _span = tracing::debug_span!("form.build", entity = %kind, mode = %options.access_mode)
            .entered();
        let mut group = creator.create(self, model, options)?;
        group.validate();
        tracing::debug!(entity = %kind, controls = group.len(), status = ?group.status(), "form built");
        Ok(group)
    }

    /// Build one group per model, in order. Every model must be a `kind`.
    pub fn build_array<'a>(
        &self,
        kind: EntityKind,
        models: impl IntoIterator<Item = ModelRef<'a>>,
        options: &FormOptions,
    ) -> FormResult<FormArray> {
        let creator = self.creator(kind)?;
        let mut items = Vec::new();
        for model in models {
            if model.kind() != kind {
                return Err(FormError::ModelMismatch {
                    expected: kind,
                    found: model.kind(),
                });
            }
            let mut group = creator.create(self, model, options)?;
            group.validate();
            items.push(FormNode::Group(group));
        }
        let mut array = FormArray::new(items);
        array.validate();
        Ok(array)
    }

    /// Build the typed form for `model`, tied to `destroy`.
    pub fn group<F: FieldKey>(
        &self,
        model: ModelRef<'_>,
        destroy: &DestroySignal,
        options: &FormOptions,
    ) -> FormResult<TypedForm<F>> {
        if model.kind() != F::ENTITY {
            return Err(FormError::ModelMismatch {
                expected: F::ENTITY,
                found: model.kind(),
            });
        }
        TypedForm::new(self.build(model, options)?, destroy.clone())
    }

    /// Build the typed line array for `models`, tied to `destroy`.
    pub fn array<'a, F: FieldKey>(
        &self,
        models: impl IntoIterator<Item = ModelRef<'a>>,
        destroy: &DestroySignal,
        options: &FormOptions,
    ) -> FormResult<TypedFormArray<F>> {
        TypedFormArray::new(self.build_array(F::ENTITY, models, options)?, destroy.clone())
    }

    /// Build by registry name, for callers that only know the entity at runtime.
    pub fn group_by_name(
        &self,
        name: &str,
        model: ModelRef<'_>,
        options: &FormOptions,
    ) -> FormResult<FormGroup> {
        let kind =
            EntityKind::from_name(name).ok_or_else(|| FormError::NotRegistered(name.to_string()))?;
        if kind != model.kind() {
            return Err(FormError::ModelMismatch {
                expected: kind,
                found: model.kind(),
            });
        }
        self.build(model, options)
    }
}

impl fmt::Debug for FormRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormRegistry")
            .field("entities", &self.kinds())
            .finish()
    }
}
