//! Closure-backed and construction-backed adapters.

use std::marker::PhantomData;

use crate::error::Result;
use crate::value::Value;

use super::capability::{Extractor, Serializer};
use super::context::{ExtractionContext, SerializationContext};

/// An [`Extractor`] backed by a closure.
pub struct FunctionExtractor<T, F> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> Extractor for FunctionExtractor<T, F>
where
    T: 'static,
    F: Fn(&ExtractionContext<'_>, &Value) -> Result<T> + Send + Sync + 'static,
{
    type Output = T;

    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<T> {
        (self.f)(ctx, from)
    }
}

/// A [`Serializer`] backed by a closure.
pub struct FunctionSerializer<T, F> {
    f: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> Serializer for FunctionSerializer<T, F>
where
    T: 'static,
    F: Fn(&SerializationContext<'_>, &T) -> Result<Value> + Send + Sync + 'static,
{
    type Input = T;

    fn to_json(&self, ctx: &SerializationContext<'_>, from: &T) -> Result<Value> {
        (self.f)(ctx, from)
    }
}

/// An adapter built from an extraction closure and a serialization closure.
pub struct FunctionAdapter<T, E, S> {
    extract: E,
    to_json: S,
    _marker: PhantomData<fn(&T) -> T>,
}

impl<T, E, S> Extractor for FunctionAdapter<T, E, S>
where
    T: 'static,
    E: Fn(&ExtractionContext<'_>, &Value) -> Result<T> + Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    type Output = T;

    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<T> {
        (self.extract)(ctx, from)
    }
}

impl<T, E, S> Serializer for FunctionAdapter<T, E, S>
where
    T: 'static,
    E: Send + Sync + 'static,
    S: Fn(&SerializationContext<'_>, &T) -> Result<Value> + Send + Sync + 'static,
{
    type Input = T;

    fn to_json(&self, ctx: &SerializationContext<'_>, from: &T) -> Result<Value> {
        (self.to_json)(ctx, from)
    }
}

/// Wrap an extraction closure.
pub fn make_extractor<T, F>(f: F) -> FunctionExtractor<T, F>
where
    T: 'static,
    F: Fn(&ExtractionContext<'_>, &Value) -> Result<T> + Send + Sync + 'static,
{
    FunctionExtractor {
        f,
        _marker: PhantomData,
    }
}

/// Wrap a serialization closure.
pub fn make_serializer<T, F>(f: F) -> FunctionSerializer<T, F>
where
    T: 'static,
    F: Fn(&SerializationContext<'_>, &T) -> Result<Value> + Send + Sync + 'static,
{
    FunctionSerializer {
        f,
        _marker: PhantomData,
    }
}

/// Wrap a pair of closures as one adapter.
pub fn make_adapter<T, E, S>(extract: E, to_json: S) -> FunctionAdapter<T, E, S>
where
    T: 'static,
    E: Fn(&ExtractionContext<'_>, &Value) -> Result<T> + Send + Sync + 'static,
    S: Fn(&SerializationContext<'_>, &T) -> Result<Value> + Send + Sync + 'static,
{
    FunctionAdapter {
        extract,
        to_json,
        _marker: PhantomData,
    }
}

/// Types that know how to build themselves from a value.
pub trait FromValue: Sized {
    /// Build an instance from `from`.
    fn from_value(ctx: &ExtractionContext<'_>, from: &Value) -> Result<Self>;
}

/// Extractor that defers to [`FromValue`].
pub struct ExtractorConstruction<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ExtractorConstruction<T> {
    /// Create the extractor.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ExtractorConstruction<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromValue + 'static> Extractor for ExtractorConstruction<T> {
    type Output = T;

    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<T> {
        T::from_value(ctx, from)
    }
}
