#![forbid(unsafe_code)]

//! Typed views over built form trees.
//!
//! The registry builds untyped [`FormGroup`]s. A [`TypedForm`] wraps one and
//! checks, once, that every field of its [`FieldKey`] enum exists. After that
//! every access by field is infallible in practice and typo-proof at compile
//! time.
//!
//! A typed form is tied to a [`DestroySignal`]. Once the signal fires the
//! form drops its listeners and rejects further patches with
//! [`FormError::Destroyed`], so no late value change reaches a torn-down page.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use shelfkit_core::DestroySignal;

use crate::control::{ControlStatus, FormArray, FormControl, FormGroup};
use crate::error::{FormError, FormResult};
use crate::registry::EntityKind;
use crate::value::FormValue;

/// Field enum of one entity.
pub trait FieldKey: Copy + Eq + fmt::Debug + 'static {
    /// The entity whose form these fields address.
    const ENTITY: EntityKind;
    /// Every field, in form order.
    const ALL: &'static [Self];

    /// Control key in the built tree.
    fn key(self) -> &'static str;
}

/// Emitted to subscribers after every patch through a [`TypedForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    /// Dotted path of the patched control.
    pub path: String,
    /// The control's new value.
    pub value: FormValue,
}

type Listener = Box<dyn FnMut(&ValueChange) + Send>;

// ---------------------------------------------------------------------------
// TypedForm
// ---------------------------------------------------------------------------

/// A form tree addressed by the field enum `F`.
pub struct TypedForm<F> {
    root: FormGroup,
    destroy: DestroySignal,
    listeners: Arc<Mutex<Vec<Listener>>>,
    _fields: PhantomData<F>,
}

impl<F: FieldKey> TypedForm<F> {
    /// Wrap `root`, failing if any field of `F` is missing.
    pub fn new(root: FormGroup, destroy: DestroySignal) -> FormResult<Self> {
        if let Some(missing) = F::ALL.iter().find(|f| !root.contains(f.key())) {
            return Err(FormError::MissingControl(missing.key().to_string()));
        }
        let listeners: Arc<Mutex<Vec<Listener>>> = Arc::new(Mutex::new(Vec::new()));
        destroy.on_destroy_for(&listeners, |listeners| {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        });
        Ok(Self {
            root,
            destroy,
            listeners,
            _fields: PhantomData,
        })
    }

    #[must_use]
    pub fn form(&self) -> &FormGroup {
        &self.root
    }

    #[must_use]
    pub fn destroy_signal(&self) -> &DestroySignal {
        &self.destroy
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroy.is_fired()
    }

    pub fn control(&self, field: F) -> FormResult<&FormControl> {
        self.root.control(field.key())
    }

    /// Raw value of a field, or `Null` if the field is not a control.
    #[must_use]
    pub fn control_value(&self, field: F) -> FormValue {
        self.control(field)
            .map(|c| c.value().clone())
            .unwrap_or_default()
    }

    pub fn array(&self, field: F) -> FormResult<&FormArray> {
        self.root.array(field.key())
    }

    /// Mutable array access. Call [`revalidate`](Self::revalidate) after
    /// structural edits.
    pub fn array_mut(&mut self, field: F) -> FormResult<&mut FormArray> {
        self.ensure_alive()?;
        self.root.array_mut(field.key())
    }

    pub fn group(&self, field: F) -> FormResult<&FormGroup> {
        self.root.group(field.key())
    }

    /// Programmatic update of one field. Does not mark the control dirty.
    pub fn patch_control_value(&mut self, field: F, value: impl Into<FormValue>) -> FormResult<()> {
        self.patch_path(field.key(), value)
    }

    /// User update of one field. Marks the control dirty when it differs
    /// from its initial value.
    pub fn set_control_value(&mut self, field: F, value: impl Into<FormValue>) -> FormResult<()> {
        self.ensure_alive()?;
        self.root.set_value(field.key(), value)?;
        self.notify(field.key());
        Ok(())
    }

    /// Patch any descendant control by dotted path (`lines.0.quantity`).
    pub fn patch_path(&mut self, path: &str, value: impl Into<FormValue>) -> FormResult<()> {
        self.ensure_alive()?;
        self.root.patch_value(path, value)?;
        self.notify(path);
        Ok(())
    }

    /// Revalidate the whole tree.
    pub fn revalidate(&mut self) {
        self.root.validate();
    }

    /// Observe every patch until the destroy signal fires.
    pub fn subscribe(&self, listener: impl FnMut(&ValueChange) + Send + 'static) -> FormResult<()> {
        self.ensure_alive()?;
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
        Ok(())
    }

    #[must_use]
    pub fn status(&self) -> ControlStatus {
        self.root.status()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.root.is_valid()
    }

    #[must_use]
    pub fn value(&self) -> FormValue {
        self.root.value()
    }

    #[must_use]
    pub fn raw_value(&self) -> FormValue {
        self.root.raw_value()
    }

    #[must_use]
    pub fn invalid_paths(&self) -> Vec<String> {
        self.root.invalid_paths()
    }

    #[must_use]
    pub fn into_inner(self) -> FormGroup {
        self.root
    }

    fn ensure_alive(&self) -> FormResult<()> {
        if self.destroy.is_fired() {
            Err(FormError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn notify(&self, path: &str) {
        let value = match self.root.control(path) {
            Ok(control) => control.value().clone(),
            Err(_) => return,
        };
        let change = ValueChange {
            path: path.to_string(),
            value,
        };
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter_mut() {
            listener(&change);
        }
    }
}

impl<F> fmt::Debug for TypedForm<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedForm")
            .field("root", &self.root)
            .field("destroyed", &self.destroy.is_fired())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TypedFormArray
// ---------------------------------------------------------------------------

/// A line-item array whose rows are all forms of `F`.
pub struct TypedFormArray<F> {
    array: FormArray,
    destroy: DestroySignal,
    _fields: PhantomData<F>,
}

impl<F: FieldKey> TypedFormArray<F> {
    /// Wrap `array`, failing if any row is not a group carrying every field.
    pub fn new(array: FormArray, destroy: DestroySignal) -> FormResult<Self> {
        for index in 0..array.len() {
            let row = array
                .group_at(index)
                .ok_or_else(|| FormError::NotAGroup(index.to_string()))?;
            if let Some(missing) = F::ALL.iter().find(|f| !row.contains(f.key())) {
                return Err(FormError::MissingControl(format!("{index}.{}", missing.key())));
            }
        }
        Ok(Self {
            array,
            destroy,
            _fields: PhantomData,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.array.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    #[must_use]
    pub fn array(&self) -> &FormArray {
        &self.array
    }

    pub fn row(&self, index: usize) -> FormResult<&FormGroup> {
        self.array
            .group_at(index)
            .ok_or(FormError::IndexOutOfRange {
                path: F::ENTITY.name().to_string(),
                index,
                len: self.array.len(),
            })
    }

    pub fn row_control(&self, index: usize, field: F) -> FormResult<&FormControl> {
        self.row(index)?.control(field.key())
    }

    /// Mutable row access. Call [`revalidate`](Self::revalidate) after
    /// enabling or disabling controls.
    pub fn row_mut(&mut self, index: usize) -> FormResult<&mut FormGroup> {
        if self.destroy.is_fired() {
            return Err(FormError::Destroyed);
        }
        let len = self.array.len();
        self.array
            .group_at_mut(index)
            .ok_or(FormError::IndexOutOfRange {
                path: F::ENTITY.name().to_string(),
                index,
                len,
            })
    }

    pub fn revalidate(&mut self) {
        self.array.validate();
    }

    /// Patch one cell and revalidate its row and the array.
    pub fn patch_row_value(
        &mut self,
        index: usize,
        field: F,
        value: impl Into<FormValue>,
    ) -> FormResult<()> {
        self.row_mut(index)?.patch_value(field.key(), value)?;
        self.array.validate();
        Ok(())
    }

    #[must_use]
    pub fn status(&self) -> ControlStatus {
        self.array.status()
    }

    #[must_use]
    pub fn into_inner(self) -> FormArray {
        self.array
    }
}

impl<F> fmt::Debug for TypedFormArray<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedFormArray")
            .field("array", &self.array)
            .finish()
    }
}
