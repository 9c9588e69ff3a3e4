#![forbid(unsafe_code)]

//! Column definitions and the displayed-column order.

/// Key of the row-selection checkbox column.
pub const SELECT_COLUMN: &str = "select";

/// A column the grid can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Displayed-column key.
    pub key: String,
    /// Header label.
    pub header: String,
    /// Dotted path of the row control backing the cell. Defaults to `key`.
    pub field: String,
    /// Header clicks cycle the sort.
    pub sortable: bool,
}

impl ColumnDef {
    #[must_use]
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            field: key.clone(),
            key,
            header: header.into(),
            sortable: false,
        }
    }

    /// Back the cell with a different row control (e.g. `uom.code`).
    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// The user-controlled column order.
///
/// An optional leading [`SELECT_COLUMN`] is kept out of the data columns:
/// it is never a navigation target and never part of the wrap modulus.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayedColumns {
    select: bool,
    data: Vec<String>,
}

impl DisplayedColumns {
    /// Parse a displayed-column list; a `select` entry anywhere turns on the
    /// selection column.
    #[must_use]
    pub fn new<S: AsRef<str>>(keys: impl IntoIterator<Item = S>) -> Self {
        let mut select = false;
        let mut data = Vec::new();
        for key in keys {
            let key = key.as_ref();
            if key == SELECT_COLUMN {
                select = true;
            } else if !data.iter().any(|k| k == key) {
                data.push(key.to_string());
            }
        }
        Self { select, data }
    }

    /// Same as [`new`](Self::new) with the selection column forced on.
    #[must_use]
    pub fn with_select<S: AsRef<str>>(keys: impl IntoIterator<Item = S>) -> Self {
        let mut columns = Self::new(keys);
        columns.select = true;
        columns
    }

    #[must_use]
    pub fn has_select(&self) -> bool {
        self.select
    }

    /// Data columns in display order.
    #[must_use]
    pub fn data_keys(&self) -> &[String] {
        &self.data
    }

    /// Every displayed key, selection column first.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let select = self.select.then_some(SELECT_COLUMN);
        select
            .into_iter()
            .chain(self.data.iter().map(String::as_str))
            .collect()
    }

    /// Number of navigable columns.
    #[must_use]
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Data index of `key`.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.data.iter().position(|k| k == key)
    }

    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.data.get(index).map(String::as_str)
    }

    /// Move a data column. Returns `false` if either index is out of range.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        if from >= self.data.len() || to >= self.data.len() {
            return false;
        }
        let key = self.data.remove(from);
        self.data.insert(to, key);
        true
    }

    /// Show a column at `index` (clamped). No-op if already shown.
    pub fn insert(&mut self, index: usize, key: impl Into<String>) {
        let key = key.into();
        if key == SELECT_COLUMN {
            self.select = true;
        } else if self.position(&key).is_none() {
            let index = index.min(self.data.len());
            self.data.insert(index, key);
        }
    }

    /// Hide a column.
    pub fn remove(&mut self, key: &str) -> bool {
        if key == SELECT_COLUMN {
            return std::mem::take(&mut self.select);
        }
        match self.position(key) {
            Some(index) => {
                self.data.remove(index);
                true
            }
            None => false,
        }
    }
}
