//! Declarative construction of a formats.
//!
//! [`FormatsBuilder`] registers adapters for application types and records
//! which types each declaration depends on. The first registration failure is
//! kept and returned by [`FormatsBuilder::build`].
//!
//! # Example
//!
//! ```
//! use jsonv::serialization::{Formats, FormatsBuilder};
//! use jsonv::Value;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u32,
//!     tags: Vec<String>,
//! }
//!
//! let formats = FormatsBuilder::new()
//!     .type_adapter::<Person, _>(|t| {
//!         t.member("name", |p: &Person| &p.name, |p: &mut Person| &mut p.name);
//!         t.member("age", |p: &Person| &p.age, |p: &mut Person| &mut p.age)
//!             .alternate_name("years")
//!             .since(2);
//!         t.member("tags", |p: &Person| &p.tags, |p: &mut Person| &mut p.tags)
//!             .default_value(Vec::new());
//!     })
//!     .register_container::<Vec<String>>()
//!     .compose_checked([Formats::defaults()])
//!     .unwrap();
//!
//! let value = jsonv::text::parse_str(r#"{"name": "Ada", "years": 36}"#).unwrap();
//! let person: Person = formats.extract(&value).unwrap();
//! assert_eq!(person.age, 36);
//! ```

mod member;
mod type_adapter;

pub use member::MemberBuilder;
pub use type_adapter::{ExtraKeys, TypeAdapter, TypeAdapterBuilder};

use indexmap::IndexMap;

use crate::error::{Error, Result, UnresolvedReference};
use crate::value::Value;

use super::adapters::{
    ContainerAdapter, EnumAdapter, MapAdapter, OptionalAdapter, PolymorphicAdapter,
    PolymorphicPointer, Sequence, StringMap, Wrapper, WrapperAdapter,
};
use super::capability::{Adapter, Extractor, Serializer};
use super::formats::{DuplicateTypeAction, Formats};
use super::type_info::TypeInfo;

/// A dependency of one registered type on another.
#[derive(Debug, Clone, Copy)]
struct Reference {
    referenced: TypeInfo,
    by: TypeInfo,
}

/// Builds a [`Formats`] from type declarations.
#[derive(Debug, Default)]
pub struct FormatsBuilder {
    formats: Formats,
    bases: Vec<Formats>,
    action: DuplicateTypeAction,
    references: Vec<Reference>,
    error: Option<Error>,
}

impl FormatsBuilder {
    /// A builder over an empty formats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy for later registrations of an already registered type.
    pub fn on_duplicate_type(mut self, action: DuplicateTypeAction) -> Self {
        self.action = action;
        self
    }

    /// Place `base` beneath this builder's registrations and beneath any
    /// earlier base. Registrations keep going into one layer, so the
    /// duplicate policy sees every type this builder registered.
    pub fn extend(mut self, base: Formats) -> Self {
        self.bases.push(base);
        self
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(err) = result {
            tracing::warn!(error = %err, "formats builder registration failed");
            if self.error.is_none() {
                self.error = Some(err);
            }
        }
    }

    fn reference<T: 'static, By: 'static>(&mut self) {
        self.references.push(Reference {
            referenced: TypeInfo::of::<T>(),
            by: TypeInfo::of::<By>(),
        });
    }

    /// Declare a struct-like type member by member.
    pub fn type_adapter<T, F>(mut self, configure: F) -> Self
    where
        T: Default + 'static,
        F: FnOnce(&mut TypeAdapterBuilder<T>),
    {
        let mut builder = TypeAdapterBuilder::new();
        configure(&mut builder);
        let adapter = builder.build();
        let by = TypeInfo::of::<T>();
        self.references
            .extend(adapter.member_types().map(|referenced| Reference { referenced, by }));
        let result = self.formats.register_adapter(adapter, self.action);
        self.record(result);
        self
    }

    /// Declare an enumeration through its label table.
    pub fn enum_type<E, I, L>(mut self, entries: I) -> Self
    where
        E: PartialEq + Clone + Send + Sync + 'static,
        I: IntoIterator<Item = (E, L)>,
        L: Into<Value>,
    {
        let result = self
            .formats
            .register_adapter(EnumAdapter::new(entries), self.action);
        self.record(result);
        self
    }

    /// Like [`enum_type`](Self::enum_type) with case-insensitive labels.
    pub fn enum_type_icase<E, I, L>(mut self, entries: I) -> Self
    where
        E: PartialEq + Clone + Send + Sync + 'static,
        I: IntoIterator<Item = (E, L)>,
        L: Into<Value>,
    {
        let result = self
            .formats
            .register_adapter(EnumAdapter::icase(entries), self.action);
        self.record(result);
        self
    }

    /// Declare a polymorphic pointer type and its subtypes.
    pub fn polymorphic_type<P, F>(mut self, configure: F) -> Self
    where
        P: PolymorphicPointer,
        F: FnOnce(&mut PolymorphicAdapter<P>) -> Result<()>,
    {
        let mut adapter = PolymorphicAdapter::<P>::new();
        let configured = configure(&mut adapter);
        self.record(configured);
        let by = TypeInfo::of::<P>();
        self.references
            .extend(adapter.subtypes().map(|referenced| Reference { referenced, by }));
        let result = self.formats.register_adapter(adapter, self.action);
        self.record(result);
        self
    }

    /// Register [`ContainerAdapter`] for `C`.
    pub fn register_container<C: Sequence>(mut self) -> Self {
        self.reference::<C::Element, C>();
        let result = self
            .formats
            .register_adapter(ContainerAdapter::<C>::new(), self.action);
        self.record(result);
        self
    }

    /// Register [`OptionalAdapter`] for `Option<T>`.
    pub fn register_optional<T: 'static>(mut self) -> Self {
        self.reference::<T, Option<T>>();
        let result = self
            .formats
            .register_adapter(OptionalAdapter::<T>::new(), self.action);
        self.record(result);
        self
    }

    /// Register [`WrapperAdapter`] for `W`.
    pub fn register_wrapper<W: Wrapper>(mut self) -> Self {
        self.reference::<W::Inner, W>();
        let result = self
            .formats
            .register_adapter(WrapperAdapter::<W>::new(), self.action);
        self.record(result);
        self
    }

    /// Register [`MapAdapter`] for `M`.
    pub fn register_map<M: StringMap>(mut self) -> Self {
        self.reference::<M::Value, M>();
        let result = self
            .formats
            .register_adapter(MapAdapter::<M>::new(), self.action);
        self.record(result);
        self
    }

    /// Register a custom adapter.
    pub fn register_adapter<A: Adapter>(mut self, adapter: A) -> Self {
        let result = self.formats.register_adapter(adapter, self.action);
        self.record(result);
        self
    }

    /// Register a custom extractor.
    pub fn register_extractor<E: Extractor>(mut self, extractor: E) -> Self {
        let result = self.formats.register_extractor(extractor, self.action);
        self.record(result);
        self
    }

    /// Register a custom serializer.
    pub fn register_serializer<S: Serializer>(mut self, serializer: S) -> Self {
        let result = self.formats.register_serializer(serializer, self.action);
        self.record(result);
        self
    }

    /// Record that `By` depends on `T`, for types the builder cannot see
    /// into (custom adapters).
    pub fn reference_type<T: 'static, By: 'static>(mut self) -> Self {
        self.reference::<T, By>();
        self
    }

    /// Verify every referenced type has both an extractor and a serializer
    /// in `formats`.
    pub fn check_references(&self, formats: &Formats) -> Result<()> {
        check_references(&self.references, formats)
    }

    /// The built formats, holding only this builder's registrations and any
    /// bases added with [`extend`](Self::extend).
    pub fn build(self) -> Result<Formats> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.bases.is_empty() {
            return Ok(self.formats);
        }
        let layers = self.bases.into_iter().rev().chain(std::iter::once(self.formats));
        Ok(Formats::compose(layers))
    }

    /// Build, compose over `bases`, and check references against the result.
    pub fn compose_checked<I>(self, bases: I) -> Result<Formats>
    where
        I: IntoIterator<Item = Formats>,
    {
        let references = self.references.clone();
        let built = self.build()?;
        let composed = Formats::compose(bases.into_iter().chain(std::iter::once(built)));
        check_references(&references, &composed)?;
        Ok(composed)
    }
}

fn check_references(references: &[Reference], formats: &Formats) -> Result<()> {
    let mut missing: IndexMap<TypeInfo, Vec<String>> = IndexMap::new();
    for reference in references {
        let known = formats.has_extractor(reference.referenced)
            && formats.has_serializer(reference.referenced);
        if known {
            continue;
        }
        let by = reference.by.display_name();
        let entry = missing.entry(reference.referenced).or_default();
        if !entry.contains(&by) {
            entry.push(by);
        }
    }
    if missing.is_empty() {
        return Ok(());
    }
    tracing::warn!(count = missing.len(), "unresolved type references");
    Err(Error::UnresolvedReferences {
        missing: missing
            .into_iter()
            .map(|(type_info, referenced_by)| UnresolvedReference {
                type_name: type_info.display_name(),
                referenced_by,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Inner {
        n: i64,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Outer {
        inner: Inner,
        list: Vec<Inner>,
    }

    fn outer(builder: FormatsBuilder) -> FormatsBuilder {
        builder.type_adapter::<Outer, _>(|t| {
            t.member("inner", |o: &Outer| &o.inner, |o: &mut Outer| &mut o.inner);
            t.member("list", |o: &Outer| &o.list, |o: &mut Outer| &mut o.list);
        })
    }

    #[test]
    fn test_unresolved_references() {
        let err = outer(FormatsBuilder::new())
            .compose_checked([Formats::defaults()])
            .unwrap_err();
        assert_eq!(err.code(), 140);
        match err {
            Error::UnresolvedReferences { missing } => {
                let names: Vec<&str> = missing.iter().map(|m| m.type_name.as_str()).collect();
                assert_eq!(names, ["Inner", "Vec<Inner>"]);
                assert_eq!(missing[0].referenced_by, ["Outer"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_resolved_after_registration() {
        let formats = outer(FormatsBuilder::new())
            .type_adapter::<Inner, _>(|t| {
                t.member("n", |i: &Inner| &i.n, |i: &mut Inner| &mut i.n);
            })
            .register_container::<Vec<Inner>>()
            .compose_checked([Formats::defaults()])
            .unwrap();
        let v = Value::object([
            ("inner", Value::object([("n", 1)])),
            ("list", Value::array([Value::object([("n", 2)])])),
        ]);
        let out: Outer = formats.extract(&v).unwrap();
        assert_eq!(out.list, vec![Inner { n: 2 }]);
        assert_eq!(formats.to_json(&out).unwrap(), v);
    }

    #[test]
    fn test_first_error_is_kept() {
        let err = FormatsBuilder::new()
            .register_optional::<i64>()
            .register_optional::<i64>()
            .build()
            .unwrap_err();
        assert_eq!(err.code(), 112);
    }

    #[test]
    fn test_duplicate_policy_replace() {
        let formats = FormatsBuilder::new()
            .on_duplicate_type(DuplicateTypeAction::Replace)
            .enum_type([(1u8, "one")])
            .enum_type([(1u8, "uno")])
            .extend(Formats::defaults())
            .build()
            .unwrap();
        assert_eq!(formats.to_json(&1u8).unwrap(), Value::from("uno"));
    }

    #[test]
    fn test_duplicate_detected_across_extend() {
        let err = FormatsBuilder::new()
            .on_duplicate_type(DuplicateTypeAction::Exception)
            .enum_type([(1u8, "one")])
            .extend(Formats::defaults())
            .enum_type([(1u8, "uno")])
            .build()
            .unwrap_err();
        assert_eq!(err.code(), 112);
    }

    #[test]
    fn test_earlier_base_wins_over_later_base() {
        let first = FormatsBuilder::new().enum_type([(1u8, "first")]).build().unwrap();
        let second = FormatsBuilder::new().enum_type([(1u8, "second")]).build().unwrap();
        let formats = FormatsBuilder::new()
            .extend(first)
            .extend(second)
            .build()
            .unwrap();
        assert_eq!(formats.to_json(&1u8).unwrap(), Value::from("first"));
    }
}
