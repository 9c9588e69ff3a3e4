#![forbid(unsafe_code)]

//! Access modes a page is opened under.
//!
//! The mode arrives as a route segment (`view`, `edit`, `add`) and is passed to
//! every form creator. It never changes after the page parses it.

use std::fmt;
use std::str::FromStr;

/// How a page (and every form it builds) may be interacted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AccessMode {
    /// Read-only: the whole form tree is disabled.
    View,
    /// Existing record: ownership fields locked, mutable fields open.
    Edit,
    /// New record: ownership fields open and required.
    Add,
}

impl AccessMode {
    /// All modes, in route order.
    pub const ALL: [AccessMode; 3] = [AccessMode::View, AccessMode::Edit, AccessMode::Add];

    /// Parse a route segment.
    ///
    /// Unknown segments are a configuration error and must not be degraded
    /// into a default mode.
    pub fn parse(segment: &str) -> Result<Self, AccessModeError> {
        match segment {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            "add" => Ok(Self::Add),
            other => Err(AccessModeError::Unhandled(other.to_string())),
        }
    }

    /// The route segment for this mode.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Add => "add",
        }
    }

    #[must_use]
    pub const fn is_view(self) -> bool {
        matches!(self, Self::View)
    }

    #[must_use]
    pub const fn is_edit(self) -> bool {
        matches!(self, Self::Edit)
    }

    #[must_use]
    pub const fn is_add(self) -> bool {
        matches!(self, Self::Add)
    }

    /// Column index into per-mode tables laid out as `[view, edit, add]`.
    #[must_use]
    pub const fn table_index(self) -> usize {
        match self {
            Self::View => 0,
            Self::Edit => 1,
            Self::Add => 2,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for AccessMode {
    type Err = AccessModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A route segment that does not name an access mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessModeError {
    /// The raw segment that could not be handled.
    Unhandled(String),
}

impl fmt::Display for AccessModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unhandled(value) => write!(f, "Unhandled Access Mode: {value}"),
        }
    }
}

impl std::error::Error for AccessModeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_segments() {
        assert_eq!(AccessMode::parse("view"), Ok(AccessMode::View));
        assert_eq!(AccessMode::parse("edit"), Ok(AccessMode::Edit));
        assert_eq!(AccessMode::parse("add"), Ok(AccessMode::Add));
    }

    #[test]
    fn segment_round_trips_through_from_str() {
        for mode in AccessMode::ALL {
            assert_eq!(mode.segment().parse::<AccessMode>(), Ok(mode));
        }
    }

    #[test]
    fn unknown_segment_is_an_error_with_message() {
        let err = AccessMode::parse("delete").unwrap_err();
        assert_eq!(err, AccessModeError::Unhandled("delete".into()));
        assert_eq!(err.to_string(), "Unhandled Access Mode: delete");
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!(AccessMode::parse("EDIT").is_err());
        assert!(AccessMode::parse("").is_err());
    }

    #[test]
    fn predicates_are_exclusive() {
        for mode in AccessMode::ALL {
            let hits = [mode.is_view(), mode.is_edit(), mode.is_add()]
                .iter()
                .filter(|b| **b)
                .count();
            assert_eq!(hits, 1, "{mode}");
        }
    }

    #[test]
    fn table_index_follows_route_order() {
        assert_eq!(AccessMode::View.table_index(), 0);
        assert_eq!(AccessMode::Edit.table_index(), 1);
        assert_eq!(AccessMode::Add.table_index(), 2);
    }
}
