#![forbid(unsafe_code)]

//! Page-level errors.

use std::fmt;

use shelfkit_core::AccessModeError;
use shelfkit_forms::FormError;

/// An external call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    message: String,
}

impl ServiceError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service call failed: {}", self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Errors surfaced by page controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The route segment is not an access mode.
    AccessMode(AccessModeError),
    /// Form construction or addressing failed.
    Form(FormError),
    /// An external call failed.
    Service(ServiceError),
    /// The action needs a loaded model.
    NotLoaded,
    /// The action is not allowed in the page's access mode.
    ReadOnly,
    /// The form has invalid fields at these paths.
    Invalid(Vec<String>),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessMode(e) => write!(f, "{e}"),
            Self::Form(e) => write!(f, "form error: {e}"),
            Self::Service(e) => write!(f, "{e}"),
            Self::NotLoaded => f.write_str("nothing loaded"),
            Self::ReadOnly => f.write_str("page is read-only"),
            Self::Invalid(paths) => write!(f, "invalid fields: {}", paths.join(", ")),
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AccessMode(e) => Some(e),
            Self::Form(e) => Some(e),
            Self::Service(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AccessModeError> for PageError {
    fn from(e: AccessModeError) -> Self {
        Self::AccessMode(e)
    }
}

impl From<FormError> for PageError {
    fn from(e: FormError) -> Self {
        Self::Form(e)
    }
}

impl From<ServiceError> for PageError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

/// Result type for page operations.
pub type PageResult<T> = Result<T, PageError>;
