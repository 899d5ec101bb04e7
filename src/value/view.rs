//! Non-owning views over array elements and object entries.
//!
//! Views are `Copy`, so iterating one does not consume it; calling
//! `iter()` again restarts from the first element.

use super::{Object, Value};

/// Borrowed view over the elements of an array value.
#[derive(Debug, Clone, Copy)]
pub struct ArrayView<'a> {
    items: &'a [Value],
}

impl<'a> ArrayView<'a> {
    /// Create a view over `items`.
    pub fn new(items: &'a [Value]) -> Self {
        Self { items }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.items.get(index)
    }

    /// Iterate the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'a, Value> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for ArrayView<'a> {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Borrowed view over the entries of an object value.
#[derive(Debug, Clone, Copy)]
pub struct ObjectView<'a> {
    map: &'a Object,
}

impl<'a> ObjectView<'a> {
    /// Create a view over `map`.
    pub fn new(map: &'a Object) -> Self {
        Self { map }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    /// Iterate `(key, value)` entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'a, String, Value> {
        self.map.iter()
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'a, String, Value> {
        self.map.keys()
    }

    /// Iterate values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'a, String, Value> {
        self.map.values()
    }
}

impl<'a> IntoIterator for ObjectView<'a> {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}
