//! Type-level declarations and the adapter they compile into.

use std::fmt;

use crate::error::{Error, Result};
use crate::serialization::capability::{Extractor, Serializer};
use crate::serialization::context::{ExtractionContext, SerializationContext};
use crate::serialization::type_info::TypeInfo;
use crate::value::{Object, Value};

use super::member::{MemberAdapter, MemberBuilder, MemberSpec};

type PreExtractFn = dyn Fn(&ExtractionContext<'_>, &Value) -> Result<()> + Send + Sync;
type PostExtractFn<T> = dyn Fn(&ExtractionContext<'_>, T) -> Result<T> + Send + Sync;
type ExtraKeysFn = dyn Fn(&ExtractionContext<'_>, &Value, &[String]) -> Result<()> + Send + Sync;

/// What extraction does with object keys no member claims.
#[derive(Default)]
pub enum ExtraKeys {
    /// Leave them alone
    #[default]
    Ignore,
    /// Fail listing them
    Fail,
    /// Pass them, in input order, to a handler which may fail
    Handler(Box<ExtraKeysFn>),
}

impl ExtraKeys {
    /// Build [`ExtraKeys::Handler`] from a closure.
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&ExtractionContext<'_>, &Value, &[String]) -> Result<()> + Send + Sync + 'static,
    {
        ExtraKeys::Handler(Box::new(f))
    }
}

impl fmt::Debug for ExtraKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraKeys::Ignore => f.write_str("Ignore"),
            ExtraKeys::Fail => f.write_str("Fail"),
            ExtraKeys::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// Collects the members and type-level options for `T`.
pub struct TypeAdapterBuilder<T: 'static> {
    adapter: TypeAdapter<T>,
}

impl<T: Default + 'static> TypeAdapterBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            adapter: TypeAdapter {
                members: Vec::new(),
                default: None,
                default_on_null: false,
                pre_extract: None,
                post_extract: Vec::new(),
                extra_keys: ExtraKeys::Ignore,
            },
        }
    }

    /// Declare a member stored under `name`, reached through a pair of
    /// accessors. Members are bound in declaration order.
    pub fn member<M, G, GM>(&mut self, name: impl Into<String>, get: G, get_mut: GM) -> MemberBuilder<'_, T, M>
    where
        M: 'static,
        G: Fn(&T) -> &M + Send + Sync + 'static,
        GM: Fn(&mut T) -> &mut M + Send + Sync + 'static,
    {
        let spec = MemberSpec::new(name.into(), Box::new(get), Box::new(get_mut));
        MemberBuilder::new(self, spec)
    }

    /// Extract JSON null as the type's initial value.
    pub fn type_default_on_null(&mut self, enabled: bool) -> &mut Self {
        self.adapter.default_on_null = enabled;
        self
    }

    /// Start every extraction from `value` instead of `T::default()`.
    ///
    /// Members missing from the input keep their value from `value`, and
    /// JSON null extracts as `value`. A member default still takes
    /// precedence for its own member.
    pub fn type_default_value(&mut self, value: T) -> &mut Self
    where
        T: Clone + Send + Sync,
    {
        self.adapter.default = Some(Box::new(move || value.clone()));
        self.adapter.default_on_null = true;
        self
    }

    /// Run `f` on the input object before any member is bound.
    pub fn pre_extract<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&ExtractionContext<'_>, &Value) -> Result<()> + Send + Sync + 'static,
    {
        self.adapter.pre_extract = Some(Box::new(f));
        self
    }

    /// Transform the bound instance. Hooks run in the order added.
    pub fn post_extract<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&ExtractionContext<'_>, T) -> Result<T> + Send + Sync + 'static,
    {
        self.adapter.post_extract.push(Box::new(f));
        self
    }

    /// Policy for keys no member claims.
    pub fn on_extract_extra_keys(&mut self, policy: ExtraKeys) -> &mut Self {
        self.adapter.extra_keys = policy;
        self
    }

    pub(crate) fn build(self) -> TypeAdapter<T> {
        self.adapter
    }
}

impl<T: 'static> TypeAdapterBuilder<T> {
    pub(crate) fn push_member(&mut self, member: Box<dyn MemberAdapter<T>>) {
        self.adapter.members.push(member);
    }
}

/// Adapter compiled from a [`TypeAdapterBuilder`]. Objects map to `T`
/// member by member.
pub struct TypeAdapter<T: 'static> {
    members: Vec<Box<dyn MemberAdapter<T>>>,
    default: Option<Box<dyn Fn() -> T + Send + Sync>>,
    default_on_null: bool,
    pre_extract: Option<Box<PreExtractFn>>,
    post_extract: Vec<Box<PostExtractFn<T>>>,
    extra_keys: ExtraKeys,
}

impl<T: Default + 'static> TypeAdapter<T> {
    fn initial(&self) -> T {
        self.default.as_ref().map_or_else(T::default, |f| f())
    }

    /// Types of the declared members, in declaration order.
    pub fn member_types(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.members.iter().map(|m| m.member_type())
    }

    fn extra_keys(&self, object: &Object) -> Vec<String> {
        object
            .keys()
            .filter(|key| !self.members.iter().any(|m| m.is_key(key)))
            .cloned()
            .collect()
    }
}

impl<T: 'static> fmt::Debug for TypeAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeAdapter")
            .field("type", &TypeInfo::of::<T>())
            .field("members", &self.members.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("extra_keys", &self.extra_keys)
            .finish()
    }
}

impl<T: Default + 'static> Extractor for TypeAdapter<T> {
    type Output = T;

    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<T> {
        if from.is_null() && self.default_on_null {
            return Ok(self.initial());
        }
        let object = from.as_object()?;
        if let Some(pre) = &self.pre_extract {
            pre(ctx, from)?;
        }

        let keep_absent = self.default.is_some();
        let mut out = self.initial();
        for member in &self.members {
            member.extract_into(ctx, object, &mut out, keep_absent)?;
        }
        for post in &self.post_extract {
            out = post(ctx, out)?;
        }

        match &self.extra_keys {
            ExtraKeys::Ignore => {}
            ExtraKeys::Fail => {
                let extra = self.extra_keys(object);
                if !extra.is_empty() {
                    return Err(Error::extraction(
                        ctx.path().clone(),
                        format!("Found extra key(s) in value: {}", extra.join(", ")),
                    ));
                }
            }
            ExtraKeys::Handler(handler) => {
                let extra = self.extra_keys(object);
                if !extra.is_empty() {
                    handler(ctx, from, &extra)?;
                }
            }
        }
        Ok(out)
    }
}

impl<T: Default + 'static> Serializer for TypeAdapter<T> {
    type Input = T;

    fn to_json(&self, ctx: &SerializationContext<'_>, from: &T) -> Result<Value> {
        let mut out = Object::with_capacity(self.members.len());
        for member in &self.members {
            member.to_json_into(ctx, from, &mut out)?;
        }
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{DuplicateTypeAction, Formats};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    fn formats(configure: impl FnOnce(&mut TypeAdapterBuilder<Point>)) -> Formats {
        let mut builder = TypeAdapterBuilder::<Point>::new();
        configure(&mut builder);
        let mut formats = Formats::compose([Formats::defaults()]);
        formats
            .register_adapter(builder.build(), DuplicateTypeAction::Exception)
            .unwrap();
        formats
    }

    fn members(t: &mut TypeAdapterBuilder<Point>) {
        t.member("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x);
        t.member("y", |p: &Point| &p.y, |p: &mut Point| &mut p.y);
    }

    #[test]
    fn test_round_trip() {
        let formats = formats(members);
        let p = Point { x: 1, y: -2 };
        let v = formats.to_json(&p).unwrap();
        assert_eq!(v, Value::object([("x", 1), ("y", -2)]));
        assert_eq!(formats.extract::<Point>(&v).unwrap(), p);
    }

    #[test]
    fn test_required_member() {
        let formats = formats(members);
        let err = formats.extract::<Point>(&Value::object([("x", 1)])).unwrap_err();
        assert_eq!(err.path().map(ToString::to_string).as_deref(), Some(".y"));
        assert_eq!(err.root_cause().code(), 101);
    }

    #[test]
    fn test_extra_keys_fail() {
        let formats = formats(|t| {
            members(t);
            t.on_extract_extra_keys(ExtraKeys::Fail);
        });
        let v = Value::object([("x", 1), ("y", 2), ("z", 3), ("w", 4)]);
        let err = formats.extract::<Point>(&v).unwrap_err();
        assert_eq!(
            err.to_string(),
            "extraction error at .: Found extra key(s) in value: z, w"
        );
    }

    #[test]
    fn test_extra_keys_handler() {
        let formats = formats(|t| {
            members(t);
            t.on_extract_extra_keys(ExtraKeys::handler(|_, _, keys| {
                Err(Error::custom(format!("unexpected {}", keys.len())))
            }));
        });
        let err = formats
            .extract::<Point>(&Value::object([("x", 1), ("y", 2), ("z", 3)]))
            .unwrap_err();
        assert_eq!(err.root_cause().to_string(), "unexpected 1");
    }

    #[test]
    fn test_type_default_value() {
        let formats = formats(|t| {
            members(t);
            t.type_default_value(Point { x: 10, y: 20 });
        });
        assert_eq!(formats.extract::<Point>(&Value::Null).unwrap(), Point { x: 10, y: 20 });
        assert_eq!(
            formats.extract::<Point>(&Value::object([("y", 5)])).unwrap(),
            Point { x: 10, y: 5 }
        );
    }

    #[test]
    fn test_member_default_overrides_type_default() {
        let formats = formats(|t| {
            t.member("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x).default_value(7);
            t.member("y", |p: &Point| &p.y, |p: &mut Point| &mut p.y);
            t.type_default_value(Point { x: 10, y: 20 });
        });
        assert_eq!(
            formats.extract::<Point>(&Value::object([("y", 5)])).unwrap(),
            Point { x: 7, y: 5 }
        );
    }

    #[test]
    fn test_post_extract_chain() {
        let formats = formats(|t| {
            members(t);
            t.post_extract(|_, mut p| {
                p.x += 1;
                Ok(p)
            })
            .post_extract(|_, mut p| {
                p.x *= 10;
                Ok(p)
            });
        });
        let p: Point = formats.extract(&Value::object([("x", 1), ("y", 0)])).unwrap();
        assert_eq!(p.x, 20);
    }

    #[test]
    fn test_default_on_null_needs_a_default() {
        let formats = formats(|t| {
            t.member("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x)
                .default_on_null(true);
            t.member("y", |p: &Point| &p.y, |p: &mut Point| &mut p.y)
                .default_value(3)
                .default_on_null(true);
        });
        let err = formats
            .extract::<Point>(&Value::object([("x", Value::Null), ("y", Value::Integer(1))]))
            .unwrap_err();
        assert_eq!(err.path().map(ToString::to_string).as_deref(), Some(".x"));
        assert_eq!(err.root_cause().code(), 100);

        let p: Point = formats
            .extract(&Value::object([("x", Value::Integer(1)), ("y", Value::Null)]))
            .unwrap();
        assert_eq!(p, Point { x: 1, y: 3 });
    }

    #[test]
    fn test_wrong_kind() {
        let err = formats(members).extract::<Point>(&Value::array([1, 2])).unwrap_err();
        assert_eq!(err.root_cause().code(), 100);
    }
}
