#![forbid(unsafe_code)]

//! Row selection.
//!
//! [`SelectionModel`] is a plain ordered set of keys. The grid rules live on
//! top of it: only selectable rows (enabled and valid) may be selected,
//! [`SelectionModel::master_toggle`] flips between "all selectable" and
//! "none", and [`SelectionModel::is_all_selected`] compares against the
//! selectable count, never the total row count.

use std::collections::BTreeSet;

/// Set of selected row keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionModel<K: Ord + Clone> {
    selected: BTreeSet<K>,
    multiple: bool,
}

impl<K: Ord + Clone> Default for SelectionModel<K> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<K: Ord + Clone> SelectionModel<K> {
    /// `multiple = false` keeps at most one key selected.
    #[must_use]
    pub fn new(multiple: bool) -> Self {
        Self {
            selected: BTreeSet::new(),
            multiple,
        }
    }

    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Select `key`. Returns `true` if the selection changed.
    pub fn select(&mut self, key: K) -> bool {
        if self.selected.contains(&key) {
            return false;
        }
        if !self.multiple {
            self.selected.clear();
        }
        self.selected.insert(key)
    }

    pub fn deselect(&mut self, key: &K) -> bool {
        self.selected.remove(key)
    }

    /// Flip `key`. Returns whether it is now selected.
    pub fn toggle(&mut self, key: K) -> bool {
        if self.selected.remove(&key) {
            false
        } else {
            self.select(key);
            true
        }
    }

    #[must_use]
    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected keys, in key order.
    #[must_use]
    pub fn selected(&self) -> Vec<K> {
        self.selected.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drop every selected key for which `keep` is false. Returns how many
    /// were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let before = self.selected.len();
        self.selected.retain(|k| keep(k));
        before - self.selected.len()
    }

    /// `true` iff the selection covers exactly the selectable keys.
    #[must_use]
    pub fn is_all_selected<'a>(&self, selectable: impl IntoIterator<Item = &'a K>) -> bool
    where
        K: 'a,
    {
        let mut count = 0;
        for key in selectable {
            if !self.selected.contains(key) {
                return false;
            }
            count += 1;
        }
        count == self.selected.len()
    }

    /// Clear when every selectable key is selected; otherwise select them all.
    pub fn master_toggle(&mut self, selectable: &[K]) {
        if self.is_all_selected(selectable) {
            self.clear();
        } else {
            self.selected = selectable.iter().cloned().collect();
        }
    }
}
