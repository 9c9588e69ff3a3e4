#![forbid(unsafe_code)]

//! Values held by form controls.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// A single value held by a control, or the aggregate value of a group/array.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormValue {
    #[default]
    Null,
    Bool(bool),
    Number(Decimal),
    Text(String),
    /// Aggregate of a group, in field order.
    Group(Vec<(String, FormValue)>),
    /// Aggregate of an array, in index order.
    List(Vec<FormValue>),
}

impl FormValue {
    /// Whether the value counts as "not provided" for `required`.
    ///
    /// Whitespace-only text and empty lists are empty; `false` and zero are not.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Group(fields) => fields.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Truthiness for optional numeric limits: null, zero, empty text and
    /// `false` are all "not set".
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => !n.is_zero(),
            Self::Text(s) => !s.is_empty(),
            Self::Group(_) | Self::List(_) => true,
        }
    }

    /// Numeric view of the value. Text is parsed after trimming.
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Field lookup on a group aggregate.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        match self {
            Self::Group(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Item lookup on a list aggregate.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&FormValue> {
        match self {
            Self::List(items) => items.get(index),
            _ => None,
        }
    }

    /// Optional text, treating null as `None`.
    #[must_use]
    pub fn to_opt_string(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Group(fields) => {
                f.write_str("{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Self::List(items) => {
                f.write_str("[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<Decimal> for FormValue {
    fn from(n: Decimal) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FormValue {
    fn from(n: i64) -> Self {
        Self::Number(Decimal::from(n))
    }
}

impl From<bool> for FormValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<FormValue>> From<Option<T>> for FormValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
