//! Script list container
//!
//! Items are unique and kept in ascending order; each carries a value the
//! script can sort or filter on.

use std::collections::BTreeMap;

/// Ordered set of items with an associated value per item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptList {
    items: BTreeMap<i64, i64>,
}

impl ScriptList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item with value 0. Adding an existing item keeps its value.
    pub fn add_item(&mut self, item: i64) {
        self.items.entry(item).or_insert(0);
    }

    /// Add an item with a value, replacing the value if present
    pub fn add_item_with_value(&mut self, item: i64, value: i64) {
        self.items.insert(item, value);
    }

    pub fn remove_item(&mut self, item: i64) -> bool {
        self.items.remove(&item).is_some()
    }

    pub fn has_item(&self, item: i64) -> bool {
        self.items.contains_key(&item)
    }

    /// Value of `item`, or 0 when absent
    pub fn get_value(&self, item: i64) -> i64 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Change the value of an existing item; returns false if absent
    pub fn set_value(&mut self, item: i64, value: i64) -> bool {
        match self.items.get_mut(&item) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items in ascending order
    pub fn items(&self) -> impl Iterator<Item = i64> + '_ {
        self.items.keys().copied()
    }

    /// `(item, value)` pairs in ascending item order
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.items.iter().map(|(item, value)| (*item, *value))
    }
}

impl FromIterator<i64> for ScriptList {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.add_item(item);
        }
        list
    }
}
