#![forbid(unsafe_code)]

//! Header-click sort state.
//!
//! Clicking a column cycles ascending → descending → unsorted. Clicking a
//! different column starts it at ascending.

use std::cmp::Ordering;

use shelfkit_forms::{FormArray, FormNode, FormValue};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Emitted on every sort change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortChange {
    pub column: String,
    /// `None` when the column went back to unsorted.
    pub direction: Option<SortDirection>,
}

/// The active sort, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridSort {
    active: Option<(String, SortDirection)>,
}

impl GridSort {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active(&self) -> Option<(&str, SortDirection)> {
        self.active.as_ref().map(|(c, d)| (c.as_str(), *d))
    }

    /// Direction of `column`, if it is the active one.
    #[must_use]
    pub fn direction_for(&self, column: &str) -> Option<SortDirection> {
        self.active
            .as_ref()
            .filter(|(c, _)| c == column)
            .map(|(_, d)| *d)
    }

    /// Advance the cycle for `column`.
    pub fn cycle(&mut self, column: &str) -> SortChange {
        let next = match self.direction_for(column) {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };
        self.active = next.map(|d| (column.to_string(), d));
        SortChange {
            column: column.to_string(),
            direction: next,
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Row indices of `rows` in sorted display order, reading each row's
    /// control at `field`. Unsorted keeps source order; the sort is stable.
    #[must_use]
    pub fn order(&self, rows: &FormArray, field: &str) -> Vec<usize> {
        let mut order: Vec<usize> = (0..rows.len()).collect();
        let Some((_, direction)) = self.active() else {
            return order;
        };
        let key = |i: usize| -> FormValue {
            rows.at(i)
                .and_then(|node| match node {
                    FormNode::Group(g) => g.get(field).map(FormNode::raw_value),
                    other => Some(other.raw_value()),
                })
                .unwrap_or_default()
        };
        order.sort_by(|&a, &b| {
            let ord = compare_values(&key(a), &key(b));
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        order
    }
}

/// Nulls first, then numbers by value, then text; mixed kinds by kind.
fn compare_values(a: &FormValue, b: &FormValue) -> Ordering {
    fn rank(v: &FormValue) -> u8 {
        match v {
            FormValue::Null => 0,
            FormValue::Bool(_) => 1,
            FormValue::Number(_) => 2,
            FormValue::Text(_) => 3,
            FormValue::Group(_) | FormValue::List(_) => 4,
        }
    }
    match (a, b) {
        (FormValue::Number(x), FormValue::Number(y)) => x.cmp(y),
        (FormValue::Text(x), FormValue::Text(y)) => x.cmp(y),
        (FormValue::Bool(x), FormValue::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
