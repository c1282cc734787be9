//! Ordered, key-addressable storage.
//!
//! [`IndexedTable`] keeps insertion order and can be addressed either by key
//! or by position. Both lookups read the same underlying sequence, so
//! `table.get(table.key_at(i)) == table.get_at(i)` holds for every index.

use indexmap::IndexMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// An insertion-ordered map that is also indexable by position.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedTable<K: Hash + Eq, V> {
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> IndexedTable<K, V> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Create an empty table with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry.
    ///
    /// A new key is appended at the end. An existing key keeps its position
    /// and the previous value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Check if the key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Get a value by key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Get a mutable value by key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key)
    }

    /// Get a value by position.
    pub fn get_at(&self, index: usize) -> Option<&V> {
        self.entries.get_index(index).map(|(_, v)| v)
    }

    /// Get a mutable value by position.
    pub fn get_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.entries.get_index_mut(index).map(|(_, v)| v)
    }

    /// Get the key stored at a position.
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.entries.get_index(index).map(|(k, _)| k)
    }

    /// Position of a key.
    pub fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_index_of(key)
    }

    /// Remove an entry, shifting later entries down by one.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.shift_remove(key)
    }

    /// Remove the entry at a position, shifting later entries down by one.
    pub fn remove_at(&mut self, index: usize) -> Option<(K, V)> {
        self.entries.shift_remove_index(index)
    }

    /// Replace the entry at `index` with a new key and value.
    ///
    /// Fails, handing the pair back, when the index is out of range or when
    /// the key already lives at a different position.
    pub fn replace_at(&mut self, index: usize, key: K, value: V) -> Result<(K, V), (K, V)> {
        if index >= self.entries.len() {
            return Err((key, value));
        }
        match self.entries.get_index_of(&key) {
            Some(existing) if existing != index => Err((key, value)),
            _ => {
                // Length is unchanged after remove + insert, so `index` stays valid.
                let old = match self.entries.shift_remove_index(index) {
                    Some(old) => old,
                    None => return Err((key, value)),
                };
                self.entries.shift_insert(index, key, value);
                Ok(old)
            }
        }
    }

    /// Stable sort of entries by a key derived from the value.
    pub fn sort_by_value_key<T, F>(&mut self, mut f: F)
    where
        T: Ord,
        F: FnMut(&V) -> T,
    {
        self.entries.sort_by(|_, a, _, b| f(a).cmp(&f(b)));
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over `(key, value)` pairs in order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, K, V> {
        self.entries.iter()
    }

    /// Iterate mutably over `(key, value)` pairs in order.
    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, K, V> {
        self.entries.iter_mut()
    }

    /// Iterate over keys in order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, K, V> {
        self.entries.keys()
    }

    /// Iterate over values in order.
    pub fn values(&self) -> indexmap::map::Values<'_, K, V> {
        self.entries.values()
    }

    /// Iterate mutably over values in order.
    pub fn values_mut(&mut self) -> indexmap::map::ValuesMut<'_, K, V> {
        self.entries.values_mut()
    }
}

impl<K: Hash + Eq, V> Default for IndexedTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for IndexedTable<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K: Hash + Eq, V> IntoIterator for IndexedTable<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K: Hash + Eq, V> IntoIterator for &'a IndexedTable<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = indexmap::map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IndexedTable<String, i32> {
        let mut table = IndexedTable::new();
        table.insert("c".to_string(), 3);
        table.insert("a".to_string(), 1);
        table.insert("b".to_string(), 2);
        table
    }

    #[test]
    fn test_insertion_order_preserved() {
        let table = sample();
        let keys: Vec<&str> = table.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_key_and_index_lookup_agree() {
        let table = sample();
        for i in 0..table.len() {
            let key = table.key_at(i).unwrap();
            assert_eq!(table.get(key.as_str()), table.get_at(i));
        }
    }

    #[test]
    fn test_insert_existing_keeps_position() {
        let mut table = sample();
        assert_eq!(table.insert("a".to_string(), 10), Some(1));
        assert_eq!(table.index_of("a"), Some(1));
        assert_eq!(table.get("a"), Some(&10));
    }

    #[test]
    fn test_remove_shifts() {
        let mut table = sample();
        assert_eq!(table.remove("c"), Some(3));
        assert_eq!(table.key_at(0).map(String::as_str), Some("a"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_replace_at() {
        let mut table = sample();
        let old = table.replace_at(1, "z".to_string(), 26).unwrap();
        assert_eq!(old, ("a".to_string(), 1));
        assert_eq!(table.key_at(1).map(String::as_str), Some("z"));
        assert!(!table.contains_key("a"));

        // Key already present at another position
        assert!(table.replace_at(0, "b".to_string(), 0).is_err());
        // Out of range
        assert!(table.replace_at(9, "q".to_string(), 0).is_err());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_stable_sort() {
        let mut table: IndexedTable<&str, (i32, &str)> = IndexedTable::new();
        table.insert("x", (2, "x"));
        table.insert("y", (1, "y"));
        table.insert("z", (2, "z"));
        table.insert("w", (1, "w"));
        table.sort_by_value_key(|v| v.0);
        let keys: Vec<&str> = table.keys().copied().collect();
        assert_eq!(keys, vec!["y", "w", "x", "z"]);
    }
}
