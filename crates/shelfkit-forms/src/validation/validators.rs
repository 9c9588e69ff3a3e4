#![forbid(unsafe_code)]

//! Core validation types and built-in validators.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::control::{FormGroup, FormNode};
use crate::value::FormValue;

// ---------------------------------------------------------------------------
// Error Codes (stable keys the UI maps to messages)
// ---------------------------------------------------------------------------

/// Error code for a missing value.
pub const ERROR_CODE_REQUIRED: &str = "required";
/// Error code for a value below its minimum.
pub const ERROR_CODE_MIN: &str = "min";
/// Error code for a value above its maximum.
pub const ERROR_CODE_MAX: &str = "max";
/// Error code for text longer than allowed.
pub const ERROR_CODE_MAX_LENGTH: &str = "maxLength";
/// Error code for a non-whole number where a whole number is required.
pub const ERROR_CODE_INVALID_INTEGER: &str = "invalidInteger";
/// Error code for a non-numeric value or one with too many decimal places.
pub const ERROR_CODE_INVALID_DECIMAL: &str = "invalidDecimal";

/// Map a known error key to a user-facing message.
///
/// Unmapped keys fall back to a generic message so new validators never
/// render as a blank error.
#[must_use]
pub fn error_message(code: &str) -> &'static str {
    match code {
        ERROR_CODE_REQUIRED => "This field is required",
        ERROR_CODE_MIN => "Value is below the minimum",
        ERROR_CODE_MAX => "Value is above the maximum",
        ERROR_CODE_MAX_LENGTH => "Value is too long",
        ERROR_CODE_INVALID_INTEGER => "Must be a whole number",
        ERROR_CODE_INVALID_DECIMAL => "Must be a valid number",
        "invalidForMinOrderQuantity" => "Quantity is below the minimum order quantity",
        "invalidForQuantityPerPack" => "Quantity must be a multiple of the pack quantity",
        _ => "Invalid value",
    }
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// One failed rule: the error key plus the limits it was checked against.
///
/// The message comes from [`error_message`], so a form shows the same text
/// for a key no matter which validator raised it.
///
/// ```rust
/// use shelfkit_forms::validation::ValidationError;
///
/// let error = ValidationError::new("min").with("min", 0).with("actual", -2);
/// assert_eq!(error.param("min"), Some("0"));
/// assert_eq!(error.to_string(), "Value is below the minimum (actual: -2, min: 0)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub params: BTreeMap<&'static str, String>,
}

impl ValidationError {
    #[must_use]
    pub fn new(code: &'static str) -> Self {
        Self {
            code,
            params: BTreeMap::new(),
        }
    }

    /// Record a limit or the offending value.
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        self.params.insert(name, value.to_string());
        self
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        error_message(self.code)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())?;
        let mut params = self.params.iter();
        if let Some((name, value)) = params.next() {
            write!(f, " ({name}: {value}")?;
            for (name, value) in params {
                write!(f, ", {name}: {value}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of one validator run.
pub type ValidationResult = Result<(), ValidationError>;

// ---------------------------------------------------------------------------
// ErrorMap
// ---------------------------------------------------------------------------

/// Errors keyed by code. One entry per failing validator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorMap {
    entries: BTreeMap<&'static str, ValidationError>,
}

impl ErrorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every validator and merge the failures.
    #[must_use]
    pub fn collect(validators: &[Arc<dyn Validator>], ctx: &ValidationContext<'_>) -> Self {
        let mut map = Self::new();
        for validator in validators {
            if let Err(err) = validator.validate(ctx) {
                map.insert(err);
            }
        }
        map
    }

    /// Insert an error. A later error with the same code replaces the earlier one.
    pub fn insert(&mut self, error: ValidationError) {
        self.entries.insert(error.code, error);
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&ValidationError> {
        self.entries.get(code)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Error codes in sorted order.
    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.entries.values()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// ValidationContext
// ---------------------------------------------------------------------------

/// What a validator can see: the value under test and the enclosing group.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Raw value of the control (disabled or not).
    pub value: &'a FormValue,
    /// The group that owns the control, if any.
    pub parent: Option<&'a FormGroup>,
}

impl<'a> ValidationContext<'a> {
    /// Context for a control outside any group.
    #[must_use]
    pub fn standalone(value: &'a FormValue) -> Self {
        Self {
            value,
            parent: None,
        }
    }

    /// Context for a control inside `parent`.
    #[must_use]
    pub fn in_group(value: &'a FormValue, parent: &'a FormGroup) -> Self {
        Self {
            value,
            parent: Some(parent),
        }
    }

    /// Current value of a sibling control (dotted paths allowed).
    ///
    /// Disabled siblings are still visible: a locked limit still constrains.
    #[must_use]
    pub fn sibling(&self, path: &str) -> Option<&'a FormValue> {
        match self.parent?.get(path)? {
            FormNode::Control(control) => Some(control.value()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Validator Trait
// ---------------------------------------------------------------------------

/// A rule that inspects a value (and optionally its siblings).
///
/// Validators are shared between clones of a form tree, so they must be
/// immutable and thread-safe.
pub trait Validator: Send + Sync {
    /// Stable identifier, used to test whether a control carries this rule.
    fn code(&self) -> &'static str;

    /// Validate the value in context.
    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult;
}

// ---------------------------------------------------------------------------
// Built-in Validators
// ---------------------------------------------------------------------------

/// Fails on null, whitespace-only text and empty lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Validator for Required {
    fn code(&self) -> &'static str {
        ERROR_CODE_REQUIRED
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        if ctx.value.is_empty() {
            Err(ValidationError::new(ERROR_CODE_REQUIRED))
        } else {
            Ok(())
        }
    }
}

/// Fails on numbers below `min`. Empty and non-numeric values pass; pair it
/// with [`Required`] and a number validator for those.
#[derive(Debug, Clone, Copy)]
pub struct Min {
    pub min: Decimal,
}

impl Min {
    #[must_use]
    pub fn new(min: Decimal) -> Self {
        Self { min }
    }
}

impl Validator for Min {
    fn code(&self) -> &'static str {
        ERROR_CODE_MIN
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        match ctx.value.as_decimal() {
            Some(actual) if actual < self.min => Err(
                ValidationError::new(ERROR_CODE_MIN)
                    .with("min", self.min)
                    .with("actual", actual),
            ),
            _ => Ok(()),
        }
    }
}

/// Fails on numbers above `max`.
#[derive(Debug, Clone, Copy)]
pub struct Max {
    pub max: Decimal,
}

impl Max {
    #[must_use]
    pub fn new(max: Decimal) -> Self {
        Self { max }
    }
}

impl Validator for Max {
    fn code(&self) -> &'static str {
        ERROR_CODE_MAX
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        match ctx.value.as_decimal() {
            Some(actual) if actual > self.max => Err(
                ValidationError::new(ERROR_CODE_MAX)
                    .with("max", self.max)
                    .with("actual", actual),
            ),
            _ => Ok(()),
        }
    }
}

/// Fails on text longer than `max` characters.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength {
    pub max: usize,
}

impl MaxLength {
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Validator for MaxLength {
    fn code(&self) -> &'static str {
        ERROR_CODE_MAX_LENGTH
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let Some(text) = ctx.value.as_text() else {
            return Ok(());
        };
        let len = text.chars().count();
        if len > self.max {
            Err(
                ValidationError::new(ERROR_CODE_MAX_LENGTH)
                    .with("max", self.max)
                    .with("actual", len),
            )
        } else {
            Ok(())
        }
    }
}

/// Fails unless the value is a whole number. Empty values pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerNumber;

impl IntegerNumber {
    /// Check a raw value without a context.
    #[must_use]
    pub fn check(value: &FormValue) -> ValidationResult {
        if value.is_empty() {
            return Ok(());
        }
        match value.as_decimal() {
            Some(n) if n.fract().is_zero() => Ok(()),
            _ => Err(ValidationError::new(ERROR_CODE_INVALID_INTEGER)),
        }
    }
}

impl Validator for IntegerNumber {
    fn code(&self) -> &'static str {
        ERROR_CODE_INVALID_INTEGER
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        Self::check(ctx.value)
    }
}

/// Fails unless the value is numeric with at most `scale` decimal places.
/// Empty values pass.
#[derive(Debug, Clone, Copy)]
pub struct DecimalNumber {
    pub scale: u32,
}

impl DecimalNumber {
    #[must_use]
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    /// Check a raw value without a context.
    #[must_use]
    pub fn check(&self, value: &FormValue) -> ValidationResult {
        if value.is_empty() {
            return Ok(());
        }
        match value.as_decimal() {
            Some(n) if n.normalize().scale() <= self.scale => Ok(()),
            _ => Err(
                ValidationError::new(ERROR_CODE_INVALID_DECIMAL)
                    .with("scale", self.scale),
            ),
        }
    }
}

impl Validator for DecimalNumber {
    fn code(&self) -> &'static str {
        ERROR_CODE_INVALID_DECIMAL
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        self.check(ctx.value)
    }
}

/// Ad-hoc validator from a closure.
pub struct FnValidator<F> {
    code: &'static str,
    f: F,
}

impl<F> FnValidator<F>
where
    F: Fn(&ValidationContext<'_>) -> ValidationResult + Send + Sync,
{
    #[must_use]
    pub fn new(code: &'static str, f: F) -> Self {
        Self { code, f }
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(&ValidationContext<'_>) -> ValidationResult + Send + Sync,
{
    fn code(&self) -> &'static str {
        self.code
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        (self.f)(ctx)
    }
}

impl<F> fmt::Debug for FnValidator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator").field("code", &self.code).finish()
    }
}
