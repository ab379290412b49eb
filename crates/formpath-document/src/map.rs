use indexmap::IndexMap;

use crate::prelude_internal::*;

/// String-keyed map that remembers insertion order.
///
/// Order matters: keyed mappings can be addressed by position when
/// [`MappingAddressing::KeyThenPosition`] is configured.
#[derive(Debug, Clone, Plural)]
#[plural(len, is_empty, iter, into_iter, into_iter_ref, new)]
pub struct Map(IndexMap<String, Value>);

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Default for Map {
    fn default() -> Self {
        Self(IndexMap::new())
    }
}

impl Map {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Entry at insertion position `index`.
    pub fn get_index(&self, index: usize) -> Option<(&str, &Value)> {
        self.0.get_index(index).map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<(&str, &mut Value)> {
        self.0.get_index_mut(index).map(|(k, v)| (k.as_str(), v))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// O(n) removal, preserves insertion order.
    pub fn remove_ordered(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut map = Map::default();
        map.insert("b", Value::Integer(2));
        map.insert("a", Value::Integer(1));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get_index(1), Some(("a", &Value::Integer(1))));
    }

    #[test]
    fn test_remove_ordered_keeps_remaining_order() {
        let mut map: Map = [
            ("x", Value::Null),
            ("y", Value::Bool(true)),
            ("z", Value::Bool(false)),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.remove_ordered("x"), Some(Value::Null));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["y", "z"]);
    }
}
