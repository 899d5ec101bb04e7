//! Runtime type identity and display names.
//!
//! [`TypeInfo`] pairs a [`TypeId`] (used for lookup) with the compiler's type
//! name (used for diagnostics). Display names go through a process-wide
//! demangle hook which applications may replace at startup. The hook never
//! influences lookup.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;

type DemangleFn = dyn Fn(&str) -> String + Send + Sync;

static DEMANGLE: LazyLock<ArcSwap<Box<DemangleFn>>> =
    LazyLock::new(|| ArcSwap::from_pointee(default_hook()));

fn default_hook() -> Box<DemangleFn> {
    Box::new(shorten_type_name)
}

/// Identity and name of a native type.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// Returns the info for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the type identity.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the compiler-provided type name.
    pub fn raw_name(&self) -> &'static str {
        self.name
    }

    /// Returns the name produced by the current demangle hook.
    pub fn display_name(&self) -> String {
        demangle(self.name)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeInfo").field(&self.name).finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Run the current demangle hook on `name`.
pub fn demangle(name: &str) -> String {
    let hook = DEMANGLE.load();
    let f: &DemangleFn = &***hook;
    f(name)
}

/// Replace the demangle hook. Intended for process startup.
pub fn set_demangle_function<F>(f: F)
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    let hook: Box<DemangleFn> = Box::new(f);
    DEMANGLE.store(Arc::new(hook));
    tracing::debug!("demangle function replaced");
}

/// Restore the default demangle hook.
pub fn reset_demangle_function() {
    DEMANGLE.store(Arc::new(default_hook()));
}

/// Default hook: drops module paths, so `alloc::vec::Vec<alloc::string::String>`
/// becomes `Vec<String>`.
pub fn shorten_type_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut segment_start = 0;
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
            continue;
        }
        out.push(c);
        if !(c.is_alphanumeric() || c == '_') {
            segment_start = out.len();
        }
    }
    out
}
