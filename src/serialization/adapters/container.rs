//! Sequence containers as JSON arrays.

use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};
use std::hash::Hash;
use std::marker::PhantomData;

use crate::error::Result;
use crate::serialization::capability::{Extractor, Serializer};
use crate::serialization::context::{ExtractionContext, SerializationContext};
use crate::value::Value;

/// A native container that maps to a JSON array.
pub trait Sequence: Default + 'static {
    /// Element type, extracted and serialized through the context
    type Element: 'static;

    /// Elements in serialization order.
    fn elements(&self) -> impl Iterator<Item = &Self::Element>;

    /// Add an element at the end.
    fn append(&mut self, element: Self::Element);

    /// Hint the number of elements about to be appended.
    fn reserve(&mut self, _additional: usize) {}
}

impl<T: 'static> Sequence for Vec<T> {
    type Element = T;

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn append(&mut self, element: T) {
        self.push(element);
    }

    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional);
    }
}

impl<T: 'static> Sequence for VecDeque<T> {
    type Element = T;

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn append(&mut self, element: T) {
        self.push_back(element);
    }

    fn reserve(&mut self, additional: usize) {
        VecDeque::reserve(self, additional);
    }
}

impl<T: 'static> Sequence for LinkedList<T> {
    type Element = T;

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn append(&mut self, element: T) {
        self.push_back(element);
    }
}

impl<T: Ord + 'static> Sequence for BTreeSet<T> {
    type Element = T;

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn append(&mut self, element: T) {
        self.insert(element);
    }
}

impl<T: Eq + Hash + 'static> Sequence for HashSet<T> {
    type Element = T;

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn append(&mut self, element: T) {
        self.insert(element);
    }

    fn reserve(&mut self, additional: usize) {
        HashSet::reserve(self, additional);
    }
}

/// Adapter for any [`Sequence`], delegating element-wise to the context.
pub struct ContainerAdapter<C> {
    _marker: PhantomData<fn() -> C>,
}

impl<C> ContainerAdapter<C> {
    /// Create the adapter.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<C> Default for ContainerAdapter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Sequence> Extractor for ContainerAdapter<C> {
    type Output = C;

    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<C> {
        let items = from.as_array()?;
        let mut out = C::default();
        out.reserve(items.len());
        for (index, item) in items.iter().enumerate() {
            out.append(ctx.extract_at(item, index)?);
        }
        Ok(out)
    }
}

impl<C: Sequence> Serializer for ContainerAdapter<C> {
    type Input = C;

    fn to_json(&self, ctx: &SerializationContext<'_>, from: &C) -> Result<Value> {
        from.elements()
            .enumerate()
            .map(|(index, element)| ctx.to_json_at(element, index))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}
