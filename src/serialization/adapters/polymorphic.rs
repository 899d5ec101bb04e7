//! Open-set subtype dispatch behind a pointer type.
//!
//! A [`PolymorphicAdapter<P>`] handles a pointer type `P` (for example
//! `Box<dyn Shape>`) whose pointee may be any of several registered
//! subtypes. Each subtype is registered with a way to recognize it in JSON
//! and a function to convert an extracted subtype into `P`.
//!
//! # Extraction
//!
//! Subtypes are tried in registration order and the first match wins.
//! A subtype matches either through an arbitrary predicate over the input or
//! through a discriminator key holding an expected value. The matched
//! subtype is extracted through the context, so it needs its own registered
//! extractor. If nothing matches, extraction fails at the current path with
//! a no-extractor cause.
//!
//! # Serialization
//!
//! The pointee is serialized with the serializer registered for its dynamic
//! type, whether or not that type was added as a subtype here. Keyed
//! subtypes then apply their [`KeyedSubtypeAction`] to the produced object.
//! Validation failures carry the context's path.
//!
//! # Null
//!
//! With `check_null_input`, JSON null extracts to the pointer's null value
//! (for `Option<Box<dyn T>>`, `None`). With `check_null_output`, an empty
//! pointer serializes to null; otherwise it is a validation error.

use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{Error, Result, Role, ValidationCode, ValidationError};
use crate::path::Path;
use crate::serialization::capability::{Extractor, Serializer};
use crate::serialization::context::{ExtractionContext, SerializationContext};
use crate::serialization::type_info::TypeInfo;
use crate::value::{Kind, Value};

/// Dynamic type information for pointees.
///
/// Implemented for every `'static` sized type. Make it a supertrait of the
/// trait behind your pointer (`trait Shape: Polymorphic`) so the concrete
/// type can be recovered through a `dyn Shape`.
pub trait Polymorphic: Any {
    /// Upcast to `Any` for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Identity of the concrete type.
    fn dyn_type_info(&self) -> TypeInfo;
}

impl<T: Any> Polymorphic for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }
}

/// A pointer to a polymorphic pointee.
pub trait PolymorphicPointer: Sized + 'static {
    /// Pointee type, usually a trait object
    type Target: ?Sized + Polymorphic;

    /// Borrow the pointee; `None` for an empty pointer.
    fn target(&self) -> Option<&Self::Target>;

    /// The empty pointer, if the pointer type has one.
    fn null() -> Option<Self> {
        None
    }
}

macro_rules! polymorphic_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: ?Sized + Polymorphic> PolymorphicPointer for $ptr<T> {
                type Target = T;

                fn target(&self) -> Option<&T> {
                    Some(&**self)
                }
            }
        )*
    };
}

polymorphic_pointer!(Box, Arc, Rc);

impl<P: PolymorphicPointer> PolymorphicPointer for Option<P> {
    type Target = P::Target;

    fn target(&self) -> Option<&P::Target> {
        self.as_ref().and_then(PolymorphicPointer::target)
    }

    fn null() -> Option<Self> {
        Some(None)
    }
}

/// What serialization does with a keyed subtype's discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyedSubtypeAction {
    /// Leave the serializer's output alone
    #[default]
    None,
    /// Require the output to already hold the discriminator
    Check,
    /// Add the discriminator, which the output must not already hold
    Insert,
}

type MatchFn = dyn Fn(&Value) -> bool + Send + Sync;
type ExtractFn<P> = dyn Fn(&ExtractionContext<'_>, &Value) -> Result<P> + Send + Sync;

enum Matcher {
    Predicate(Box<MatchFn>),
    Keyed {
        key: String,
        value: Value,
        action: KeyedSubtypeAction,
    },
}

impl Matcher {
    fn matches(&self, from: &Value) -> bool {
        match self {
            Matcher::Predicate(f) => f(from),
            Matcher::Keyed { key, value, .. } => from.get(key) == Some(value),
        }
    }
}

struct Subtype<P> {
    type_info: TypeInfo,
    matcher: Matcher,
    extract: Box<ExtractFn<P>>,
}

/// Adapter dispatching to registered subtypes.
pub struct PolymorphicAdapter<P> {
    subtypes: Vec<Subtype<P>>,
    check_null_input: bool,
    check_null_output: bool,
}

impl<P: PolymorphicPointer> PolymorphicAdapter<P> {
    /// An adapter with no subtypes and both null checks off.
    pub fn new() -> Self {
        Self {
            subtypes: Vec::new(),
            check_null_input: false,
            check_null_output: false,
        }
    }

    fn push<S, F>(&mut self, matcher: Matcher, upcast: F) -> Result<&mut Self>
    where
        S: 'static,
        F: Fn(S) -> P + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<S>();
        if self.subtypes.iter().any(|s| s.type_info == type_info) {
            return Err(Error::DuplicateType {
                role: Role::Extractor,
                type_info,
            });
        }
        self.subtypes.push(Subtype {
            type_info,
            matcher,
            extract: Box::new(move |ctx: &ExtractionContext<'_>, from: &Value| {
                ctx.extract::<S>(from).map(&upcast)
            }),
        });
        Ok(self)
    }

    /// Add subtype `S`, selected when `matches` accepts the input.
    pub fn add_subtype<S, M, F>(&mut self, matches: M, upcast: F) -> Result<&mut Self>
    where
        S: 'static,
        M: Fn(&Value) -> bool + Send + Sync + 'static,
        F: Fn(S) -> P + Send + Sync + 'static,
    {
        self.push(Matcher::Predicate(Box::new(matches)), upcast)
    }

    /// Add subtype `S`, selected when the input's `key` equals `value`.
    pub fn add_subtype_keyed<S, F>(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
        action: KeyedSubtypeAction,
        upcast: F,
    ) -> Result<&mut Self>
    where
        S: 'static,
        F: Fn(S) -> P + Send + Sync + 'static,
    {
        let matcher = Matcher::Keyed {
            key: key.into(),
            value: value.into(),
            action,
        };
        self.push(matcher, upcast)
    }

    /// Extract JSON null as the pointer's null value.
    pub fn check_null_input(&mut self, enabled: bool) -> &mut Self {
        self.check_null_input = enabled;
        self
    }

    /// Serialize an empty pointer as JSON null.
    pub fn check_null_output(&mut self, enabled: bool) -> &mut Self {
        self.check_null_output = enabled;
        self
    }

    /// Registered subtypes in registration order.
    pub fn subtypes(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.subtypes.iter().map(|s| s.type_info)
    }
}

impl<P: PolymorphicPointer> Default for PolymorphicAdapter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PolymorphicPointer> Extractor for PolymorphicAdapter<P> {
    type Output = P;

    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<P> {
        if from.is_null() && self.check_null_input {
            return P::null().ok_or_else(|| Error::kind(Kind::Object, Kind::Null));
        }
        match self.subtypes.iter().find(|s| s.matcher.matches(from)) {
            Some(subtype) => (subtype.extract)(ctx, from),
            None => Err(Error::Extraction {
                path: ctx.path().clone(),
                message: format!("No discriminators matched JSON value: {from}"),
                cause: Some(Box::new(Error::NoExtractor {
                    type_info: TypeInfo::of::<P>(),
                })),
            }),
        }
    }
}

impl<P: PolymorphicPointer> Serializer for PolymorphicAdapter<P> {
    type Input = P;

    fn to_json(&self, ctx: &SerializationContext<'_>, from: &P) -> Result<Value> {
        let Some(target) = from.target() else {
            if self.check_null_output {
                return Ok(Value::Null);
            }
            return Err(ValidationError::new(ValidationCode::NullPointer, ctx.path().clone(), Value::Null).into());
        };
        let type_info = <P::Target as Polymorphic>::dyn_type_info(target);
        let out = ctx.to_json_any(<P::Target as Polymorphic>::as_any(target), type_info)?;
        match self.subtypes.iter().find(|s| s.type_info == type_info).map(|s| &s.matcher) {
            Some(Matcher::Keyed { key, value, action }) => apply_action(ctx.path(), out, key, value, *action),
            _ => Ok(out),
        }
    }
}

fn apply_action(
    path: &Path,
    mut out: Value,
    key: &str,
    expected: &Value,
    action: KeyedSubtypeAction,
) -> Result<Value> {
    if action == KeyedSubtypeAction::None {
        return Ok(out);
    }
    if !out.is_object() {
        return Err(ValidationError::new(ValidationCode::SubtypeNotObject, path.clone(), out).into());
    }
    let at_key = path + key;
    match (action, out.get(key).cloned()) {
        (KeyedSubtypeAction::Check, None) => {
            Err(ValidationError::new(ValidationCode::DiscriminatorMissing, at_key, out).into())
        }
        (KeyedSubtypeAction::Check, Some(found)) if found != *expected => {
            Err(ValidationError::new(ValidationCode::DiscriminatorMismatch, at_key, found).into())
        }
        (KeyedSubtypeAction::Insert, Some(found)) => {
            Err(ValidationError::new(ValidationCode::DiscriminatorPresent, at_key, found).into())
        }
        (KeyedSubtypeAction::Insert, None) => {
            if let Value::Object(object) = &mut out {
                object.shift_insert(0, key.to_string(), expected.clone());
            }
            Ok(out)
        }
        _ => Ok(out),
    }
}
