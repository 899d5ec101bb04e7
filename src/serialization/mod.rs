//! Conversion between [`Value`] trees and native types.
//!
//! # Architecture
//!
//! - [`version`] - `major.minor` versions gating member rules
//! - [`type_info`] - runtime type identity and the demangle hook
//! - [`capability`] - the [`Extractor`] and [`Serializer`] traits
//! - [`formats`] - the layered registry
//! - [`context`] - per-call state and recursive lookup
//! - [`adapters`] - containers, optionals, enums and polymorphic pointers
//! - [`builder`] - declarative construction of formats
//!
//! # Example
//!
//! ```
//! use jsonv::serialization::{extract, to_json, Formats, FormatsBuilder};
//! use jsonv::Value;
//!
//! let formats = FormatsBuilder::new()
//!     .register_container::<Vec<i32>>()
//!     .extend(Formats::defaults())
//!     .build()
//!     .unwrap();
//!
//! let value = to_json(&vec![1, 2, 3], &formats).unwrap();
//! assert_eq!(value, Value::array([1, 2, 3]));
//! let back: Vec<i32> = extract(&value, &formats).unwrap();
//! assert_eq!(back, vec![1, 2, 3]);
//! ```

pub mod adapters;
pub mod builder;
pub mod capability;
pub mod context;
mod defaults;
pub mod formats;
pub mod function;
pub mod type_info;
pub mod version;

pub use adapters::{
    ContainerAdapter, EnumAdapter, KeyedSubtypeAction, MapAdapter, OptionalAdapter, Polymorphic,
    PolymorphicAdapter, PolymorphicPointer, Sequence, StringMap, Wrapper, WrapperAdapter,
};
pub use builder::{ExtraKeys, FormatsBuilder, MemberBuilder, TypeAdapter, TypeAdapterBuilder};
pub use capability::{Adapter, DynSerializer, ErasedSerializer, Extractor, Serializer};
pub use context::{ContextBase, ExtractionContext, SerializationContext};
pub use formats::{DuplicateTypeAction, Formats};
pub use function::{
    make_adapter, make_extractor, make_serializer, ExtractorConstruction, FromValue,
    FunctionAdapter, FunctionExtractor, FunctionSerializer,
};
pub use type_info::{demangle, reset_demangle_function, set_demangle_function, TypeInfo};
pub use version::Version;

use crate::error::Result;
use crate::value::Value;

/// Extract a `T` from `from` using `formats`.
pub fn extract<T: 'static>(from: &Value, formats: &Formats) -> Result<T> {
    formats.extract(from)
}

/// Extract a `T` from `from` using the global formats.
pub fn extract_global<T: 'static>(from: &Value) -> Result<T> {
    Formats::global().extract(from)
}

/// Serialize `from` using `formats` and validate the result.
pub fn to_json<T: 'static>(from: &T, formats: &Formats) -> Result<Value> {
    formats.to_json(from)
}

/// Serialize `from` using the global formats and validate the result.
pub fn to_json_global<T: 'static>(from: &T) -> Result<Value> {
    Formats::global().to_json(from)
}
