//! Extractor and serializer capabilities.
//!
//! Typed traits ([`Extractor`], [`Serializer`]) are what applications
//! implement. The registry stores them type-erased so that one table can hold
//! handlers for arbitrary native types:
//!
//! - extractors are stored as `Arc<dyn Extractor<Output = T>>` inside an
//!   `Arc<dyn Any>` and recovered with a typed downcast on lookup;
//! - serializers are wrapped in [`ErasedSerializer`], which implements the
//!   object-safe [`DynSerializer`] by downcasting `&dyn Any` input, so a
//!   serializer can also be found from a value's dynamic type.

use std::any::Any;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::Value;

use super::context::{ExtractionContext, SerializationContext};
use super::type_info::TypeInfo;

/// Reads a [`Value`] into a native type.
pub trait Extractor: Send + Sync + 'static {
    /// The native type produced.
    type Output: 'static;

    /// Produce an instance from `from`.
    ///
    /// Failures without a path are tagged with the context's path by the
    /// caller, so implementations only need to add paths for sub-values they
    /// visit themselves (normally through [`ExtractionContext::extract_sub`]).
    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<Self::Output>;

    /// Identity of the native type produced.
    fn output_type(&self) -> TypeInfo {
        TypeInfo::of::<Self::Output>()
    }
}

/// Produces a [`Value`] from a native type.
pub trait Serializer: Send + Sync + 'static {
    /// The native type consumed.
    type Input: 'static;

    /// Produce a value from `from`.
    fn to_json(&self, ctx: &SerializationContext<'_>, from: &Self::Input) -> Result<Value>;

    /// Identity of the native type consumed.
    fn input_type(&self) -> TypeInfo {
        TypeInfo::of::<Self::Input>()
    }
}

/// Both directions for one native type.
pub trait Adapter: Extractor + Serializer<Input = <Self as Extractor>::Output> {}

impl<A> Adapter for A where A: Extractor + Serializer<Input = <A as Extractor>::Output> {}

/// Object-safe serializer over `&dyn Any` input.
pub trait DynSerializer: Send + Sync + 'static {
    /// Identity of the native type accepted.
    fn input_type(&self) -> TypeInfo;

    /// Serialize `from`, which must be of the type reported by `input_type`.
    fn to_json_dyn(&self, ctx: &SerializationContext<'_>, from: &dyn Any) -> Result<Value>;
}

/// Adapts a typed [`Serializer`] to [`DynSerializer`].
pub struct ErasedSerializer<S: Serializer> {
    inner: Arc<S>,
}

impl<S: Serializer> ErasedSerializer<S> {
    /// Wrap a shared serializer.
    pub fn new(inner: Arc<S>) -> Self {
        Self { inner }
    }
}

impl<S: Serializer> DynSerializer for ErasedSerializer<S> {
    fn input_type(&self) -> TypeInfo {
        self.inner.input_type()
    }

    fn to_json_dyn(&self, ctx: &SerializationContext<'_>, from: &dyn Any) -> Result<Value> {
        match from.downcast_ref::<S::Input>() {
            Some(typed) => self.inner.to_json(ctx, typed),
            None => Err(Error::custom(format!(
                "serializer for {} received a value of another type",
                self.inner.input_type()
            ))),
        }
    }
}

/// A registered extractor with its output type erased.
#[derive(Clone)]
pub(crate) struct ErasedExtractor {
    output_type: TypeInfo,
    handle: Arc<dyn Any + Send + Sync>,
}

impl ErasedExtractor {
    pub(crate) fn new<E: Extractor>(extractor: Arc<E>) -> Self {
        let output_type = extractor.output_type();
        let typed: Arc<dyn Extractor<Output = E::Output>> = extractor;
        Self {
            output_type,
            handle: Arc::new(typed),
        }
    }

    pub(crate) fn output_type(&self) -> TypeInfo {
        self.output_type
    }

    /// Recover the typed extractor. Fails only if `T` is not the output type.
    pub(crate) fn typed<T: 'static>(&self) -> Result<Arc<dyn Extractor<Output = T>>> {
        self.handle
            .downcast_ref::<Arc<dyn Extractor<Output = T>>>()
            .cloned()
            .ok_or_else(|| Error::NoExtractor {
                type_info: TypeInfo::of::<T>(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::Formats;

    struct Doubler;

    impl Extractor for Doubler {
        type Output = i64;

        fn extract(&self, _ctx: &ExtractionContext<'_>, from: &Value) -> Result<i64> {
            Ok(from.as_integer()? * 2)
        }
    }

    impl Serializer for Doubler {
        type Input = i64;

        fn to_json(&self, _ctx: &SerializationContext<'_>, from: &i64) -> Result<Value> {
            Ok(Value::Integer(from / 2))
        }
    }

    #[test]
    fn test_erased_extractor_round_trip() {
        let erased = ErasedExtractor::new(Arc::new(Doubler));
        assert_eq!(erased.output_type(), TypeInfo::of::<i64>());
        let typed = erased.typed::<i64>().unwrap();
        let formats = Formats::new();
        let ctx = ExtractionContext::new(&formats);
        assert_eq!(typed.extract(&ctx, &Value::Integer(4)).unwrap(), 8);
        assert!(erased.typed::<String>().is_err());
    }

    #[test]
    fn test_erased_serializer_checks_type() {
        let erased = ErasedSerializer::new(Arc::new(Doubler));
        let formats = Formats::new();
        let ctx = SerializationContext::new(&formats);
        assert_eq!(erased.to_json_dyn(&ctx, &10i64).unwrap(), Value::Integer(5));
        assert!(erased.to_json_dyn(&ctx, &"wrong").is_err());
        assert_eq!(DynSerializer::input_type(&erased), TypeInfo::of::<i64>());
    }
}
