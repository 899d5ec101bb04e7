//! String-keyed maps as JSON objects.

use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

use indexmap::IndexMap;

use crate::error::Result;
use crate::serialization::capability::{Extractor, Serializer};
use crate::serialization::context::{ExtractionContext, SerializationContext};
use crate::value::{Object, Value};

/// A native map keyed by strings.
pub trait StringMap: Default + 'static {
    /// Mapped type
    type Value: 'static;

    /// Entries in serialization order.
    fn entries(&self) -> impl Iterator<Item = (&str, &Self::Value)>;

    /// Insert an entry, replacing any previous one with the same key.
    fn put(&mut self, key: String, value: Self::Value);
}

impl<V: 'static> StringMap for BTreeMap<String, V> {
    type Value = V;

    fn entries(&self) -> impl Iterator<Item = (&str, &V)> {
        self.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn put(&mut self, key: String, value: V) {
        self.insert(key, value);
    }
}

impl<V: 'static> StringMap for HashMap<String, V> {
    type Value = V;

    fn entries(&self) -> impl Iterator<Item = (&str, &V)> {
        self.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn put(&mut self, key: String, value: V) {
        self.insert(key, value);
    }
}

impl<V: 'static> StringMap for IndexMap<String, V> {
    type Value = V;

    fn entries(&self) -> impl Iterator<Item = (&str, &V)> {
        self.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn put(&mut self, key: String, value: V) {
        self.insert(key, value);
    }
}

/// Adapter for any [`StringMap`].
pub struct MapAdapter<M> {
    _marker: PhantomData<fn() -> M>,
}

impl<M> MapAdapter<M> {
    /// Create the adapter.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<M> Default for MapAdapter<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: StringMap> Extractor for MapAdapter<M> {
    type Output = M;

    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<M> {
        let mut out = M::default();
        for (key, value) in from.as_object()? {
            out.put(key.clone(), ctx.extract_at(value, key.as_str())?);
        }
        Ok(out)
    }
}

impl<M: StringMap> Serializer for MapAdapter<M> {
    type Input = M;

    fn to_json(&self, ctx: &SerializationContext<'_>, from: &M) -> Result<Value> {
        let mut out = Object::new();
        for (key, value) in from.entries() {
            out.insert(key.to_string(), ctx.to_json_at(value, key)?);
        }
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{DuplicateTypeAction, Formats};

    #[test]
    fn test_btree_map() {
        let mut formats = Formats::compose([Formats::defaults()]);
        formats
            .register_adapter(MapAdapter::<BTreeMap<String, i64>>::new(), DuplicateTypeAction::Exception)
            .unwrap();
        let v = Value::object([("b", Value::Integer(2)), ("a", Value::Integer(1))]);
        let map: BTreeMap<String, i64> = formats.extract(&v).unwrap();
        assert_eq!(map.get("a"), Some(&1));
        // Sorted on the way out.
        let out = formats.to_json(&map).unwrap();
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn test_value_failure_has_key() {
        let mut formats = Formats::compose([Formats::defaults()]);
        formats
            .register_adapter(MapAdapter::<IndexMap<String, i64>>::new(), DuplicateTypeAction::Exception)
            .unwrap();
        let v = Value::object([("my key", Value::Null)]);
        let err = formats.extract::<IndexMap<String, i64>>(&v).unwrap_err();
        assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("[\"my key\"]"));
    }
}
