//! Per-call state threaded through extraction and serialization.
//!
//! Contexts borrow the formats and any user data for the duration of one
//! top-level call. They are cheap to clone, and sub-extraction creates a new
//! context with a longer path instead of mutating the caller's.

use std::any::Any;
use std::fmt;

use crate::error::Result;
use crate::path::{Path, PathElement};
use crate::value::Value;

use super::capability::Extractor;
use super::formats::Formats;
use super::type_info::TypeInfo;
use super::version::Version;

/// State shared by both directions: formats, version and user data.
#[derive(Clone, Copy)]
pub struct ContextBase<'a> {
    formats: &'a Formats,
    version: Version,
    user_data: Option<&'a dyn Any>,
}

impl<'a> ContextBase<'a> {
    /// A base bound to `formats` with an empty version and no user data.
    pub fn new(formats: &'a Formats) -> Self {
        Self {
            formats,
            version: Version::empty(),
            user_data: None,
        }
    }

    /// The formats used for lookups.
    pub fn formats(&self) -> &'a Formats {
        self.formats
    }

    /// The active version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The user data, if it was set and has type `U`.
    pub fn user_data<U: 'static>(&self) -> Option<&'a U> {
        self.user_data.and_then(|data| data.downcast_ref::<U>())
    }
}

impl fmt::Debug for ContextBase<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBase")
            .field("formats", self.formats)
            .field("version", &self.version)
            .field("has_user_data", &self.user_data.is_some())
            .finish()
    }
}

/// Context for one extraction.
#[derive(Debug, Clone)]
pub struct ExtractionContext<'a> {
    base: ContextBase<'a>,
    path: Path,
}

impl<'a> ExtractionContext<'a> {
    /// A context at the root path with an empty version.
    pub fn new(formats: &'a Formats) -> Self {
        Self {
            base: ContextBase::new(formats),
            path: Path::root(),
        }
    }

    /// Set the active version.
    pub fn with_version(mut self, version: impl Into<Version>) -> Self {
        self.base.version = version.into();
        self
    }

    /// Attach application data for custom extractors.
    pub fn with_user_data(mut self, data: &'a dyn Any) -> Self {
        self.base.user_data = Some(data);
        self
    }

    /// Start at `path` instead of the root.
    pub fn with_path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    /// Shared state.
    pub fn base(&self) -> &ContextBase<'a> {
        &self.base
    }

    /// The formats used for lookups.
    pub fn formats(&self) -> &'a Formats {
        self.base.formats
    }

    /// The active version.
    pub fn version(&self) -> Version {
        self.base.version
    }

    /// The user data, if it was set and has type `U`.
    pub fn user_data<U: 'static>(&self) -> Option<&'a U> {
        self.base.user_data()
    }

    /// Location of the value this context is extracting.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A context one element deeper.
    pub fn child(&self, element: impl Into<PathElement>) -> ExtractionContext<'a> {
        ExtractionContext {
            base: self.base,
            path: self.path.child(element),
        }
    }

    /// Extract a `T` from `from` using the registered extractor.
    pub fn extract<T: 'static>(&self, from: &Value) -> Result<T> {
        self.formats()
            .get_extractor::<T>()
            .and_then(|extractor| extractor.extract(self, from))
            .map_err(|e| e.at_path(&self.path))
    }

    /// Extract a `T` from the element of `from` named by `element`.
    ///
    /// A missing element fails with a not-found error tagged with the
    /// element's path.
    pub fn extract_sub<T: 'static>(&self, from: &Value, element: impl Into<PathElement>) -> Result<T> {
        let element = element.into();
        let child = self.child(element.clone());
        let sub = from.at_element(&element).map_err(|e| e.at_path(&child.path))?;
        child.extract(sub)
    }

    /// Extract a `T` from `sub`, which lives at `element` below this context.
    pub fn extract_at<T: 'static>(&self, sub: &Value, element: impl Into<PathElement>) -> Result<T> {
        self.child(element).extract(sub)
    }

    /// Run a specific extractor instead of the registered one.
    pub fn extract_with<E>(&self, extractor: &E, from: &Value) -> Result<E::Output>
    where
        E: Extractor + ?Sized,
    {
        extractor
            .extract(self, from)
            .map_err(|e| e.at_path(&self.path))
    }
}

/// Context for one serialization.
///
/// The path locates the value being written inside the output tree, so
/// serializers can report validation failures where they happen.
#[derive(Debug, Clone)]
pub struct SerializationContext<'a> {
    base: ContextBase<'a>,
    path: Path,
}

impl<'a> SerializationContext<'a> {
    /// A context at the root path with an empty version.
    pub fn new(formats: &'a Formats) -> Self {
        Self {
            base: ContextBase::new(formats),
            path: Path::root(),
        }
    }

    /// Set the active version.
    pub fn with_version(mut self, version: impl Into<Version>) -> Self {
        self.base.version = version.into();
        self
    }

    /// Attach application data for custom serializers.
    pub fn with_user_data(mut self, data: &'a dyn Any) -> Self {
        self.base.user_data = Some(data);
        self
    }

    /// Shared state.
    pub fn base(&self) -> &ContextBase<'a> {
        &self.base
    }

    /// The formats used for lookups.
    pub fn formats(&self) -> &'a Formats {
        self.base.formats
    }

    /// The active version.
    pub fn version(&self) -> Version {
        self.base.version
    }

    /// The user data, if it was set and has type `U`.
    pub fn user_data<U: 'static>(&self) -> Option<&'a U> {
        self.base.user_data()
    }

    /// Location of the value this context is writing.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A context one element deeper.
    pub fn child(&self, element: impl Into<PathElement>) -> SerializationContext<'a> {
        SerializationContext {
            base: self.base,
            path: self.path.child(element),
        }
    }

    /// Serialize `from`, which is written at `element` below this context.
    pub fn to_json_at<T: 'static>(&self, from: &T, element: impl Into<PathElement>) -> Result<Value> {
        self.child(element).to_json(from)
    }

    /// Serialize `from` using the serializer registered for `T`.
    pub fn to_json<T: 'static>(&self, from: &T) -> Result<Value> {
        self.to_json_any(from, TypeInfo::of::<T>())
    }

    /// Serialize a value whose concrete type is only known at runtime.
    pub fn to_json_any(&self, from: &dyn Any, type_info: TypeInfo) -> Result<Value> {
        self.formats()
            .get_serializer(type_info)?
            .to_json_dyn(self, from)
    }
}
