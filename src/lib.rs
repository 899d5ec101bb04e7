//! jsonv - JSON values with a composable, versioned conversion registry.
//!
//! Application types are converted to and from the dynamic [`Value`] tree
//! without knowing anything about JSON. Conversions live in a [`Formats`]
//! registry, looked up by native type at runtime.
//!
//! # Architecture
//!
//! - [`value`] - the value tree, comparison, views and coercion
//! - [`path`] - locations inside a value, used in error reports
//! - [`serialization`] - versions, capabilities, registry, contexts,
//!   adapters and the declarative builder
//! - [`validate`] - checks applied to serialized trees
//! - [`text`] - JSON text parsing and encoding
//! - [`error`] - the error taxonomy with stable numeric codes
//!
//! # Concurrency
//!
//! A built [`Formats`] is immutable and can be shared across threads for
//! lookups. Registration takes `&mut Formats` and happens before the formats
//! is published. Contexts are created per call and never shared.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod error;
pub mod path;
pub mod serialization;
pub mod text;
pub mod validate;
pub mod value;

// Re-export commonly used types
pub use error::{Error, Result, ValidationCode, ValidationError};
pub use path::{Path, PathElement};
pub use serialization::{
    extract, extract_global, to_json, to_json_global, DuplicateTypeAction, ExtractionContext,
    Extractor, Formats, FormatsBuilder, SerializationContext, Serializer, Version,
};
pub use validate::validate;
pub use value::{Kind, Object, Value};
