#![forbid(unsafe_code)]

//! The form tree: controls, groups and arrays.
//!
//! # Invariants
//!
//! 1. A disabled control carries no errors and reports [`ControlStatus::Disabled`].
//! 2. A group or array is disabled iff every child is disabled (an empty array
//!    keeps an explicit flag).
//! 3. A group is valid iff every *enabled* descendant is valid.
//! 4. `value()` omits disabled children; `raw_value()` includes them.
//! 5. Validation runs bottom-up over the whole tree, so cross-field rules always
//!    read the siblings' current values.

use std::fmt;
use std::sync::Arc;

use crate::error::{FormError, FormResult};
use crate::validation::{ErrorMap, ValidationContext, Validator};
use crate::value::FormValue;

/// Validity state of any node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlStatus {
    Valid,
    Invalid,
    Disabled,
}

impl ControlStatus {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::Invalid)
    }

    #[must_use]
    pub const fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled)
    }
}

// ---------------------------------------------------------------------------
// FormControl
// ---------------------------------------------------------------------------

/// A leaf holding one value.
#[derive(Clone)]
pub struct FormControl {
    value: FormValue,
    initial: FormValue,
    validators: Vec<Arc<dyn Validator>>,
    disabled: bool,
    touched: bool,
    dirty: bool,
    errors: ErrorMap,
}

impl FormControl {
    /// Create an enabled control with no validators.
    #[must_use]
    pub fn new(value: impl Into<FormValue>) -> Self {
        let value = value.into();
        Self {
            initial: value.clone(),
            value,
            validators: Vec::new(),
            disabled: false,
            touched: false,
            dirty: false,
            errors: ErrorMap::new(),
        }
    }

    /// Builder: attach a validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self.revalidate_standalone();
        self
    }

    /// Builder: start disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disable();
        self
    }

    pub fn add_validator(&mut self, validator: Arc<dyn Validator>) {
        self.validators.push(validator);
        self.revalidate_standalone();
    }

    pub fn clear_validators(&mut self) {
        self.validators.clear();
        self.errors.clear();
    }

    /// Whether a validator with this code is attached.
    #[must_use]
    pub fn has_validator(&self, code: &str) -> bool {
        self.validators.iter().any(|v| v.code() == code)
    }

    #[must_use]
    pub fn value(&self) -> &FormValue {
        &self.value
    }

    #[must_use]
    pub fn initial_value(&self) -> &FormValue {
        &self.initial
    }

    /// User-driven change: marks the control dirty when the value differs
    /// from its initial value.
    ///
    /// Revalidates without siblings. Outside this crate values change through
    /// [`FormGroup::set_value`], which reruns cross-field rules.
    pub(crate) fn set_value(&mut self, value: impl Into<FormValue>) {
        self.value = value.into();
        self.dirty = self.value != self.initial;
        self.revalidate_standalone();
    }

    /// Programmatic change: dirty state is left alone. See
    /// [`set_value`](Self::set_value) for the sibling caveat.
    pub(crate) fn patch_value(&mut self, value: impl Into<FormValue>) {
        self.value = value.into();
        self.revalidate_standalone();
    }

    /// Restore the initial value and clear interaction state.
    pub fn reset(&mut self) {
        self.value = self.initial.clone();
        self.dirty = false;
        self.touched = false;
        self.revalidate_standalone();
    }

    pub fn disable(&mut self) {
        self.disabled = true;
        self.errors.clear();
    }

    pub fn enable(&mut self) {
        self.disabled = false;
        self.revalidate_standalone();
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    #[must_use]
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    #[must_use]
    pub fn has_error(&self, code: &str) -> bool {
        self.errors.contains(code)
    }

    #[must_use]
    pub fn status(&self) -> ControlStatus {
        if self.disabled {
            ControlStatus::Disabled
        } else if self.errors.is_empty() {
            ControlStatus::Valid
        } else {
            ControlStatus::Invalid
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status().is_valid()
    }

    /// Errors this control would carry inside `parent`.
    fn compute_errors(&self, parent: Option<&FormGroup>) -> ErrorMap {
        if self.disabled {
            return ErrorMap::new();
        }
        let ctx = ValidationContext {
            value: &self.value,
            parent,
        };
        ErrorMap::collect(&self.validators, &ctx)
    }

    /// Revalidate without sibling access. Groups revalidate with siblings in
    /// [`FormGroup::validate`].
    fn revalidate_standalone(&mut self) {
        self.errors = self.compute_errors(None);
    }
}

impl fmt::Debug for FormControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.validators.iter().map(|v| v.code()).collect();
        f.debug_struct("FormControl")
            .field("value", &self.value)
            .field("disabled", &self.disabled)
            .field("validators", &codes)
            .field("errors", &self.errors.codes().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// FormNode
// ---------------------------------------------------------------------------

/// Any node in the form tree.
#[derive(Debug, Clone)]
pub enum FormNode {
    Control(FormControl),
    Group(FormGroup),
    Array(FormArray),
}

impl FormNode {
    #[must_use]
    pub fn status(&self) -> ControlStatus {
        match self {
            Self::Control(c) => c.status(),
            Self::Group(g) => g.status(),
            Self::Array(a) => a.status(),
        }
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        match self {
            Self::Control(c) => c.is_disabled(),
            Self::Group(g) => g.is_disabled(),
            Self::Array(a) => a.is_disabled(),
        }
    }

    pub fn disable(&mut self) {
        match self {
            Self::Control(c) => c.disable(),
            Self::Group(g) => g.disable(),
            Self::Array(a) => a.disable(),
        }
    }

    pub fn enable(&mut self) {
        match self {
            Self::Control(c) => c.enable(),
            Self::Group(g) => g.enable(),
            Self::Array(a) => a.enable(),
        }
    }

    /// Value with disabled descendants omitted. `None` when this node is disabled.
    #[must_use]
    pub fn value(&self) -> Option<FormValue> {
        if self.is_disabled() {
            return None;
        }
        Some(match self {
            Self::Control(c) => c.value().clone(),
            Self::Group(g) => g.value(),
            Self::Array(a) => a.value(),
        })
    }

    #[must_use]
    pub fn raw_value(&self) -> FormValue {
        match self {
            Self::Control(c) => c.value().clone(),
            Self::Group(g) => g.raw_value(),
            Self::Array(a) => a.raw_value(),
        }
    }

    fn validate_children(&mut self) {
        match self {
            Self::Control(_) => {}
            Self::Group(g) => g.validate(),
            Self::Array(a) => a.validate(),
        }
    }

    #[must_use]
    pub fn as_control(&self) -> Option<&FormControl> {
        match self {
            Self::Control(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_control_mut(&mut self) -> Option<&mut FormControl> {
        match self {
            Self::Control(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_group(&self) -> Option<&FormGroup> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_group_mut(&mut self) -> Option<&mut FormGroup> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&FormArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array_mut(&mut self) -> Option<&mut FormArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    fn child(&self, segment: &str) -> Option<&FormNode> {
        match self {
            Self::Group(g) => g.node(segment),
            Self::Array(a) => segment.parse::<usize>().ok().and_then(|i| a.at(i)),
            Self::Control(_) => None,
        }
    }

    fn child_mut(&mut self, segment: &str) -> Option<&mut FormNode> {
        match self {
            Self::Group(g) => g.node_mut(segment),
            Self::Array(a) => segment.parse::<usize>().ok().and_then(|i| a.at_mut(i)),
            Self::Control(_) => None,
        }
    }
}

impl From<FormControl> for FormNode {
    fn from(c: FormControl) -> Self {
        Self::Control(c)
    }
}

impl From<FormGroup> for FormNode {
    fn from(g: FormGroup) -> Self {
        Self::Group(g)
    }
}

impl From<FormArray> for FormNode {
    fn from(a: FormArray) -> Self {
        Self::Array(a)
    }
}

// ---------------------------------------------------------------------------
// FormGroup
// ---------------------------------------------------------------------------

/// Named children in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FormGroup {
    controls: Vec<(String, FormNode)>,
}

impl FormGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add or replace a child.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, node: impl Into<FormNode>) -> Self {
        self.insert(key, node);
        self
    }

    /// Add a child, replacing any existing child with the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<FormNode>) {
        let key = key.into();
        let node = node.into();
        match self.controls.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = node,
            None => self.controls.push((key, node)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FormNode> {
        let index = self.controls.iter().position(|(k, _)| k == key)?;
        Some(self.controls.remove(index).1)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.controls.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.controls.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormNode)> {
        self.controls.iter().map(|(k, n)| (k.as_str(), n))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Direct child by key.
    #[must_use]
    pub fn node(&self, key: &str) -> Option<&FormNode> {
        self.controls.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    #[must_use]
    pub fn node_mut(&mut self, key: &str) -> Option<&mut FormNode> {
        self.controls
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, n)| n)
    }

    /// Descendant by dotted path (`lines.0.quantity`).
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FormNode> {
        let mut segments = path.split('.');
        let mut node = self.node(segments.next()?)?;
        for segment in segments {
            node = node.child(segment)?;
        }
        Some(node)
    }

    #[must_use]
    pub fn get_mut(&mut self, path: &str) -> Option<&mut FormNode> {
        let mut segments = path.split('.');
        let mut node = self.node_mut(segments.next()?)?;
        for segment in segments {
            node = node.child_mut(segment)?;
        }
        Some(node)
    }

    /// Control at `path`, or an error naming what was found instead.
    pub fn control(&self, path: &str) -> FormResult<&FormControl> {
        self.get(path)
            .ok_or_else(|| FormError::MissingControl(path.to_string()))?
            .as_control()
            .ok_or_else(|| FormError::NotAControl(path.to_string()))
    }

    pub fn control_mut(&mut self, path: &str) -> FormResult<&mut FormControl> {
        self.get_mut(path)
            .ok_or_else(|| FormError::MissingControl(path.to_string()))?
            .as_control_mut()
            .ok_or_else(|| FormError::NotAControl(path.to_string()))
    }

    pub fn array(&self, path: &str) -> FormResult<&FormArray> {
        self.get(path)
            .ok_or_else(|| FormError::MissingControl(path.to_string()))?
            .as_array()
            .ok_or_else(|| FormError::NotAnArray(path.to_string()))
    }

    pub fn array_mut(&mut self, path: &str) -> FormResult<&mut FormArray> {
        self.get_mut(path)
            .ok_or_else(|| FormError::MissingControl(path.to_string()))?
            .as_array_mut()
            .ok_or_else(|| FormError::NotAnArray(path.to_string()))
    }

    pub fn group(&self, path: &str) -> FormResult<&FormGroup> {
        self.get(path)
            .ok_or_else(|| FormError::MissingControl(path.to_string()))?
            .as_group()
            .ok_or_else(|| FormError::NotAGroup(path.to_string()))
    }

    /// Patch the control at `path` and revalidate the whole group.
    pub fn patch_value(&mut self, path: &str, value: impl Into<FormValue>) -> FormResult<()> {
        self.control_mut(path)?.patch_value(value);
        self.validate();
        Ok(())
    }

    /// Set (user change) the control at `path` and revalidate the whole group.
    pub fn set_value(&mut self, path: &str, value: impl Into<FormValue>) -> FormResult<()> {
        self.control_mut(path)?.set_value(value);
        self.validate();
        Ok(())
    }

    /// Disable every descendant.
    pub fn disable(&mut self) {
        for (_, node) in &mut self.controls {
            node.disable();
        }
    }

    /// Enable every descendant and revalidate.
    pub fn enable(&mut self) {
        for (_, node) in &mut self.controls {
            node.enable();
        }
        self.validate();
    }

    /// Disabled iff non-empty and every child is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        !self.controls.is_empty() && self.controls.iter().all(|(_, n)| n.is_disabled())
    }

    #[must_use]
    pub fn status(&self) -> ControlStatus {
        if self.is_disabled() {
            return ControlStatus::Disabled;
        }
        if self
            .controls
            .iter()
            .any(|(_, n)| n.status() == ControlStatus::Invalid)
        {
            ControlStatus::Invalid
        } else {
            ControlStatus::Valid
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status().is_valid()
    }

    /// Aggregate of enabled children.
    #[must_use]
    pub fn value(&self) -> FormValue {
        FormValue::Group(
            self.controls
                .iter()
                .filter_map(|(k, n)| n.value().map(|v| (k.clone(), v)))
                .collect(),
        )
    }

    /// Aggregate of all children.
    #[must_use]
    pub fn raw_value(&self) -> FormValue {
        FormValue::Group(
            self.controls
                .iter()
                .map(|(k, n)| (k.clone(), n.raw_value()))
                .collect(),
        )
    }

    /// Revalidate every descendant, children before parents.
    pub fn validate(&mut self) {
        for (_, node) in &mut self.controls {
            node.validate_children();
        }
        let computed: Vec<(usize, ErrorMap)> = self
            .controls
            .iter()
            .enumerate()
            .filter_map(|(i, (_, node))| {
                node.as_control()
                    .map(|control| (i, control.compute_errors(Some(self))))
            })
            .collect();
        for (i, errors) in computed {
            if let FormNode::Control(control) = &mut self.controls[i].1 {
                control.errors = errors;
            }
        }
    }

    /// Paths of all invalid enabled controls, depth-first.
    #[must_use]
    pub fn invalid_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (key, node) in self.iter() {
            collect_invalid(key.to_string(), node, &mut out);
        }
        out
    }
}

fn collect_invalid(path: String, node: &FormNode, out: &mut Vec<String>) {
    match node {
        FormNode::Control(c) => {
            if c.status().is_invalid() {
                out.push(path);
            }
        }
        FormNode::Group(g) => {
            for (key, child) in g.iter() {
                collect_invalid(format!("{path}.{key}"), child, out);
            }
        }
        FormNode::Array(a) => {
            if !a.errors().is_empty() {
                out.push(path.clone());
            }
            for (i, child) in a.iter().enumerate() {
                collect_invalid(format!("{path}.{i}"), child, out);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FormArray
// ---------------------------------------------------------------------------

/// Ordered, index-stable children, usually one group per line item.
#[derive(Clone, Default)]
pub struct FormArray {
    items: Vec<FormNode>,
    validators: Vec<Arc<dyn Validator>>,
    errors: ErrorMap,
    disabled: bool,
}

impl FormArray {
    #[must_use]
    pub fn new(items: Vec<FormNode>) -> Self {
        Self {
            items,
            validators: Vec::new(),
            errors: ErrorMap::new(),
            disabled: false,
        }
    }

    /// Builder: attach an array-level validator (it sees the raw list value).
    #[must_use]
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn add_validator(&mut self, validator: Arc<dyn Validator>) {
        self.validators.push(validator);
    }

    #[must_use]
    pub fn has_validator(&self, code: &str) -> bool {
        self.validators.iter().any(|v| v.code() == code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn at(&self, index: usize) -> Option<&FormNode> {
        self.items.get(index)
    }

    #[must_use]
    pub fn at_mut(&mut self, index: usize) -> Option<&mut FormNode> {
        self.items.get_mut(index)
    }

    /// Group at `index`, for arrays of line items.
    #[must_use]
    pub fn group_at(&self, index: usize) -> Option<&FormGroup> {
        self.items.get(index).and_then(FormNode::as_group)
    }

    #[must_use]
    pub fn group_at_mut(&mut self, index: usize) -> Option<&mut FormGroup> {
        self.items.get_mut(index).and_then(FormNode::as_group_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormNode> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FormNode> {
        self.items.iter_mut()
    }

    /// Append an item. A disabled array disables the new item.
    pub fn push(&mut self, item: impl Into<FormNode>) {
        let mut item = item.into();
        if self.disabled {
            item.disable();
        }
        self.items.push(item);
        self.validate();
    }

    pub fn remove_at(&mut self, index: usize) -> Option<FormNode> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.validate();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.validate();
    }

    pub fn disable(&mut self) {
        self.disabled = true;
        for item in &mut self.items {
            item.disable();
        }
        self.errors.clear();
    }

    pub fn enable(&mut self) {
        self.disabled = false;
        for item in &mut self.items {
            item.enable();
        }
        self.validate();
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        if self.items.is_empty() {
            self.disabled
        } else {
            self.items.iter().all(FormNode::is_disabled)
        }
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    #[must_use]
    pub fn has_error(&self, code: &str) -> bool {
        self.errors.contains(code)
    }

    #[must_use]
    pub fn status(&self) -> ControlStatus {
        if self.is_disabled() {
            return ControlStatus::Disabled;
        }
        if !self.errors.is_empty()
            || self
                .items
                .iter()
                .any(|n| n.status() == ControlStatus::Invalid)
        {
            ControlStatus::Invalid
        } else {
            ControlStatus::Valid
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status().is_valid()
    }

    #[must_use]
    pub fn value(&self) -> FormValue {
        FormValue::List(self.items.iter().filter_map(FormNode::value).collect())
    }

    #[must_use]
    pub fn raw_value(&self) -> FormValue {
        FormValue::List(self.items.iter().map(FormNode::raw_value).collect())
    }

    /// Revalidate items, then the array-level rules.
    pub fn validate(&mut self) {
        for item in &mut self.items {
            match item {
                // Bare controls in an array have no siblings.
                FormNode::Control(c) => c.revalidate_standalone(),
                other => other.validate_children(),
            }
        }
        self.errors = if self.is_disabled() {
            ErrorMap::new()
        } else {
            let raw = self.raw_value();
            ErrorMap::collect(&self.validators, &ValidationContext::standalone(&raw))
        };
    }
}

impl fmt::Debug for FormArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.validators.iter().map(|v| v.code()).collect();
        f.debug_struct("FormArray")
            .field("items", &self.items)
            .field("validators", &codes)
            .field("disabled", &self.disabled)
            .finish()
    }
}
