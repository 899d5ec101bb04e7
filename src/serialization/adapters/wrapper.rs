//! Owning smart pointers serialized as their contents.

use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::Result;
use crate::serialization::capability::{Extractor, Serializer};
use crate::serialization::context::{ExtractionContext, SerializationContext};
use crate::value::Value;

/// A pointer that always holds exactly one `Inner`.
pub trait Wrapper: 'static {
    /// Pointee type
    type Inner: 'static;

    /// Box up a freshly extracted value.
    fn wrap(inner: Self::Inner) -> Self;

    /// Borrow the pointee.
    fn inner(&self) -> &Self::Inner;
}

macro_rules! wrapper {
    ($($ptr:ident),*) => {
        $(
            impl<T: 'static> Wrapper for $ptr<T> {
                type Inner = T;

                fn wrap(inner: T) -> Self {
                    $ptr::new(inner)
                }

                fn inner(&self) -> &T {
                    self
                }
            }
        )*
    };
}

wrapper!(Box, Arc, Rc);

/// Adapter for any [`Wrapper`].
pub struct WrapperAdapter<W> {
    _marker: PhantomData<fn() -> W>,
}

impl<W> WrapperAdapter<W> {
    /// Create the adapter.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<W> Default for WrapperAdapter<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Wrapper> Extractor for WrapperAdapter<W> {
    type Output = W;

    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<W> {
        ctx.extract(from).map(W::wrap)
    }
}

impl<W: Wrapper> Serializer for WrapperAdapter<W> {
    type Input = W;

    fn to_json(&self, ctx: &SerializationContext<'_>, from: &W) -> Result<Value> {
        ctx.to_json(from.inner())
    }
}
