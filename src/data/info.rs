//! Auxiliary key-value metadata attached to mesh objects.
//!
//! Info entries are named integers that sit beside, not inside, the attribute
//! containers. Ghost-layer depths are stored here.

use std::collections::BTreeMap;

/// Named integer annotations on a mesh object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InfoMap {
    entries: BTreeMap<String, i64>,
}

impl InfoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `value` to `key`. Returns the previous value, if any.
    pub fn set(&mut self, key: &str, value: i64) -> Option<i64> {
        self.entries.insert(key.to_string(), value)
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<i64> {
        self.entries.remove(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mesh objects that carry an [`InfoMap`].
pub trait HasInfo {
    fn info(&self) -> &InfoMap;
    fn info_mut(&mut self) -> &mut InfoMap;
}

impl HasInfo for InfoMap {
    fn info(&self) -> &InfoMap {
        self
    }
    fn info_mut(&mut self) -> &mut InfoMap {
        self
    }
}
