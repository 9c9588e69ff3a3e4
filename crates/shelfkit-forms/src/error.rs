#![forbid(unsafe_code)]

//! Configuration and access errors for form construction.
//!
//! These are programmer errors: an unregistered entity, a model handed to
//! the wrong creator, or a path that does not exist in the built tree. They
//! surface as `Err` immediately; field-level validation failures are data
//! and live in each control's [`ErrorMap`](crate::validation::ErrorMap).

use std::fmt;

use crate::registry::EntityKind;

/// Errors raised while building or addressing a form tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// No creator is registered under this entity name.
    NotRegistered(String),
    /// A creator received a model of another entity.
    ModelMismatch {
        expected: EntityKind,
        found: EntityKind,
    },
    /// The path does not resolve to any node.
    MissingControl(String),
    /// The path resolves, but not to a control.
    NotAControl(String),
    /// The path resolves, but not to an array.
    NotAnArray(String),
    /// The path resolves, but not to a group.
    NotAGroup(String),
    /// An array index beyond the current length.
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    /// The form's destroy signal has fired.
    Destroyed,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRegistered(name) => write!(f, "form creator not found: {name}"),
            Self::ModelMismatch { expected, found } => {
                write!(f, "model mismatch: expected {expected}, found {found}")
            }
            Self::MissingControl(path) => write!(f, "no control at '{path}'"),
            Self::NotAControl(path) => write!(f, "'{path}' is not a control"),
            Self::NotAnArray(path) => write!(f, "'{path}' is not an array"),
            Self::NotAGroup(path) => write!(f, "'{path}' is not a group"),
            Self::IndexOutOfRange { path, index, len } => {
                write!(f, "index {index} out of range for '{path}' (len {len})")
            }
            Self::Destroyed => f.write_str("form has been destroyed"),
        }
    }
}

impl std::error::Error for FormError {}

/// Result type for form operations.
pub type FormResult<T> = Result<T, FormError>;
