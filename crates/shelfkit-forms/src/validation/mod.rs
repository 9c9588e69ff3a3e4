#![forbid(unsafe_code)]

//! Field validation with merged error maps.
//!
//! Every validator attached to a control runs on each revalidation and
//! contributes at most one named error into the control's [`ErrorMap`].
//! Validators see the control's value and, when the control lives in a group,
//! its siblings, so cross-field rules read the *current* sibling values at
//! validation time rather than values captured at construction.
//!
//! # Example
//!
//! ```rust
//! use shelfkit_forms::validation::{ErrorMap, Min, Required, ValidationContext, Validator};
//! use shelfkit_forms::FormValue;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let validators: Vec<Arc<dyn Validator>> =
//!     vec![Arc::new(Required), Arc::new(Min::new(Decimal::ZERO))];
//! let value = FormValue::from(-3i64);
//! let errors = ErrorMap::collect(&validators, &ValidationContext::standalone(&value));
//! assert!(errors.contains("min"));
//! assert!(!errors.contains("required"));
//! ```

mod validators;

pub use validators::{
    // Error codes
    ERROR_CODE_INVALID_DECIMAL,
    ERROR_CODE_INVALID_INTEGER,
    ERROR_CODE_MAX,
    ERROR_CODE_MAX_LENGTH,
    ERROR_CODE_MIN,
    ERROR_CODE_REQUIRED,
    // Built-in validators
    DecimalNumber,
    // Core types
    ErrorMap,
    FnValidator,
    IntegerNumber,
    Max,
    MaxLength,
    Min,
    Required,
    ValidationContext,
    ValidationError,
    ValidationResult,
    Validator,
    // Messages
    error_message,
};
