//! Member-level declarations.

use crate::error::{Error, Result};
use crate::path::PathElement;
use crate::serialization::context::{ExtractionContext, SerializationContext};
use crate::serialization::type_info::TypeInfo;
use crate::serialization::version::Version;
use crate::value::Object;

use super::type_adapter::TypeAdapterBuilder;

type GetFn<T, M> = dyn Fn(&T) -> &M + Send + Sync;
type GetMutFn<T, M> = dyn Fn(&mut T) -> &mut M + Send + Sync;
type DefaultFn<M> = dyn Fn() -> M + Send + Sync;
type CheckFn<M> = dyn Fn(&M) -> Result<()> + Send + Sync;
type EncodeIfFn<M> = dyn Fn(&SerializationContext<'_>, &M) -> bool + Send + Sync;

/// Version bounds for one member. All present bounds must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct VersionRange {
    since: Option<Version>,
    until: Option<Version>,
    after: Option<Version>,
    before: Option<Version>,
}

impl VersionRange {
    /// The empty version is inside every range.
    pub(crate) fn contains(&self, version: Version) -> bool {
        if version.is_empty() {
            return true;
        }
        self.since.map_or(true, |v| version >= v)
            && self.until.map_or(true, |v| version < v)
            && self.after.map_or(true, |v| version > v)
            && self.before.map_or(true, |v| version < v)
    }
}

/// One member binding of a type adapter, with the member type erased.
pub(crate) trait MemberAdapter<T>: Send + Sync {
    /// Primary key.
    fn name(&self) -> &str;

    /// Returns true if `key` is the primary key or an alternate.
    fn is_key(&self, key: &str) -> bool;

    /// Type of the member.
    fn member_type(&self) -> TypeInfo;

    /// Bind this member from `from` into `out`. With `keep_absent`, a missing
    /// key leaves `out` untouched instead of failing.
    fn extract_into(
        &self,
        ctx: &ExtractionContext<'_>,
        from: &Object,
        out: &mut T,
        keep_absent: bool,
    ) -> Result<()>;

    /// Write this member of `from` into `out`, unless gated or filtered.
    fn to_json_into(&self, ctx: &SerializationContext<'_>, from: &T, out: &mut Object) -> Result<()>;
}

pub(crate) struct MemberSpec<T, M> {
    name: String,
    alternates: Vec<String>,
    get: Box<GetFn<T, M>>,
    get_mut: Box<GetMutFn<T, M>>,
    range: VersionRange,
    default: Option<Box<DefaultFn<M>>>,
    default_on_null: bool,
    optional: bool,
    check_input: Option<Box<CheckFn<M>>>,
    encode_if: Option<Box<EncodeIfFn<M>>>,
}

impl<T, M> MemberSpec<T, M> {
    pub(crate) fn new(name: String, get: Box<GetFn<T, M>>, get_mut: Box<GetMutFn<T, M>>) -> Self {
        Self {
            name,
            alternates: Vec::new(),
            get,
            get_mut,
            range: VersionRange::default(),
            default: None,
            default_on_null: false,
            optional: false,
            check_input: None,
            encode_if: None,
        }
    }

    fn apply_default(&self, out: &mut T) -> bool {
        match &self.default {
            Some(default) => {
                *(self.get_mut)(out) = default();
                true
            }
            None => false,
        }
    }
}

impl<T: 'static, M: 'static> MemberAdapter<T> for MemberSpec<T, M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_key(&self, key: &str) -> bool {
        self.name == key || self.alternates.iter().any(|a| a == key)
    }

    fn member_type(&self) -> TypeInfo {
        TypeInfo::of::<M>()
    }

    fn extract_into(
        &self,
        ctx: &ExtractionContext<'_>,
        from: &Object,
        out: &mut T,
        keep_absent: bool,
    ) -> Result<()> {
        if !self.range.contains(ctx.version()) {
            return Ok(());
        }
        let found = std::iter::once(&self.name)
            .chain(&self.alternates)
            .find_map(|key| from.get(key).map(|value| (key, value)));

        let Some((key, value)) = found else {
            if self.apply_default(out) || self.optional || keep_absent {
                return Ok(());
            }
            let element = PathElement::Key(self.name.clone());
            return Err(Error::NotFound {
                element: element.clone(),
            }
            .at_path(&(ctx.path() + element)));
        };

        if value.is_null() && self.default_on_null && self.apply_default(out) {
            return Ok(());
        }

        let child = ctx.child(key.as_str());
        let member: M = child.extract(value)?;
        if let Some(check) = &self.check_input {
            check(&member).map_err(|e| e.at_path(child.path()))?;
        }
        *(self.get_mut)(out) = member;
        Ok(())
    }

    fn to_json_into(&self, ctx: &SerializationContext<'_>, from: &T, out: &mut Object) -> Result<()> {
        if !self.range.contains(ctx.version()) {
            return Ok(());
        }
        let member = (self.get)(from);
        if let Some(encode_if) = &self.encode_if {
            if !encode_if(ctx, member) {
                return Ok(());
            }
        }
        out.insert(self.name.clone(), ctx.to_json_at(member, self.name.as_str())?);
        Ok(())
    }
}

/// Fluent options for one member. The member is added to its type when the
/// builder is dropped, normally at the end of the statement.
///
/// A member is required unless it has a default or is marked
/// [`optional`](MemberBuilder::optional).
pub struct MemberBuilder<'b, T: 'static, M: 'static> {
    owner: &'b mut TypeAdapterBuilder<T>,
    spec: Option<MemberSpec<T, M>>,
}

impl<'b, T: 'static, M: 'static> MemberBuilder<'b, T, M> {
    pub(crate) fn new(owner: &'b mut TypeAdapterBuilder<T>, spec: MemberSpec<T, M>) -> Self {
        Self {
            owner,
            spec: Some(spec),
        }
    }

    fn with(mut self, f: impl FnOnce(&mut MemberSpec<T, M>)) -> Self {
        if let Some(spec) = self.spec.as_mut() {
            f(spec);
        }
        self
    }

    /// Also accept `name` as the key on extraction. Alternates are tried in
    /// the order they were added, after the primary key.
    pub fn alternate_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with(|s| s.alternates.push(name))
    }

    /// Only applies at versions `>= version`.
    pub fn since(self, version: impl Into<Version>) -> Self {
        let version = version.into();
        self.with(|s| s.range.since = Some(version))
    }

    /// Only applies at versions `< version`.
    pub fn until(self, version: impl Into<Version>) -> Self {
        let version = version.into();
        self.with(|s| s.range.until = Some(version))
    }

    /// Only applies at versions `> version`.
    pub fn after(self, version: impl Into<Version>) -> Self {
        let version = version.into();
        self.with(|s| s.range.after = Some(version))
    }

    /// Only applies at versions `< version`.
    pub fn before(self, version: impl Into<Version>) -> Self {
        let version = version.into();
        self.with(|s| s.range.before = Some(version))
    }

    /// Use `value` when the key is absent.
    pub fn default_value(self, value: M) -> Self
    where
        M: Clone + Send + Sync,
    {
        self.with(|s| s.default = Some(Box::new(move || value.clone())))
    }

    /// Compute the value to use when the key is absent.
    pub fn default_with<F>(self, f: F) -> Self
    where
        F: Fn() -> M + Send + Sync + 'static,
    {
        self.with(|s| s.default = Some(Box::new(f)))
    }

    /// Treat a JSON null like an absent key. Only takes effect when the
    /// member has a default; otherwise null is extracted like any value.
    pub fn default_on_null(self, enabled: bool) -> Self {
        self.with(|s| s.default_on_null = enabled)
    }

    /// An absent key leaves the member at the type's initial value.
    pub fn optional(self) -> Self {
        self.with(|s| s.optional = true)
    }

    /// Validate the extracted member. Failures are tagged with its path.
    pub fn check_input<F>(self, f: F) -> Self
    where
        F: Fn(&M) -> Result<()> + Send + Sync + 'static,
    {
        self.with(|s| s.check_input = Some(Box::new(f)))
    }

    /// Only serialize the member when `f` returns true.
    pub fn encode_if<F>(self, f: F) -> Self
    where
        F: Fn(&SerializationContext<'_>, &M) -> bool + Send + Sync + 'static,
    {
        self.with(|s| s.encode_if = Some(Box::new(f)))
    }
}

impl<T: 'static, M: 'static> Drop for MemberBuilder<'_, T, M> {
    fn drop(&mut self) {
        if let Some(spec) = self.spec.take() {
            self.owner.push_member(Box::new(spec));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_range() {
        let range = VersionRange {
            since: Some(Version::new(2, 0)),
            until: Some(Version::new(5, 0)),
            ..VersionRange::default()
        };
        assert!(range.contains(Version::empty()));
        assert!(!range.contains(Version::new(1, 9)));
        assert!(range.contains(Version::new(2, 0)));
        assert!(range.contains(Version::new(4, 9)));
        assert!(!range.contains(Version::new(5, 0)));
    }

    #[test]
    fn test_after_before_are_strict() {
        let range = VersionRange {
            after: Some(Version::new(1, 0)),
            before: Some(Version::new(3, 0)),
            ..VersionRange::default()
        };
        assert!(!range.contains(Version::new(1, 0)));
        assert!(range.contains(Version::new(1, 1)));
        assert!(!range.contains(Version::new(3, 0)));
    }
}
