//! The dynamic JSON value tree.
//!
//! [`Value`] is a closed tagged union over the seven JSON kinds. Integers and
//! decimals are distinct kinds so that round-trips preserve the distinction,
//! but they compare numerically against each other.
//!
//! # Requirements
//!
//! - Objects keep insertion order and unique keys; re-inserting a key keeps
//!   its position and replaces its value (last write wins)
//! - Accessors fail with [`Error::Kind`] on the wrong kind and with
//!   [`Error::NotFound`] on a missing index or key, never with a silent null
//! - `integer -> decimal` widening always succeeds; no other implicit
//!   conversion happens (see [`coerce`] for the loose conversions)
//! - Equality, ordering and hashing are total and mutually consistent

mod compare;
pub mod coerce;
mod serde_impl;
mod view;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::{Path, PathElement};

pub use view::{ArrayView, ObjectView};

/// Insertion-ordered map used for object values.
pub type Object = IndexMap<String, Value>;

/// The kind of a [`Value`].
///
/// Variants are declared in comparison rank order, except that integers and
/// decimals share a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// A 64-bit signed integer
    Integer,
    /// A 64-bit floating point number
    Decimal,
    /// A UTF-8 string
    String,
    /// An ordered sequence of values
    Array,
    /// An insertion-ordered map from string to value
    Object,
}

impl Kind {
    /// Returns the kind name used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Decimal => "decimal",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    /// Rank used to order values of different kinds.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Kind::Null => 0,
            Kind::Boolean => 1,
            Kind::Integer | Kind::Decimal => 2,
            Kind::String => 3,
            Kind::Array => 4,
            Kind::Object => 5,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON value.
///
/// Cloning is a deep copy; no two values ever alias each other's children.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// JSON null literal
    #[default]
    Null,
    /// JSON boolean
    Boolean(bool),
    /// Number without fraction or exponent that fits in an i64
    Integer(i64),
    /// Any other number
    Decimal(f64),
    /// JSON string
    String(String),
    /// JSON array
    Array(Vec<Value>),
    /// JSON object
    Object(Object),
}

impl Value {
    /// Build an array from any sequence of convertible items.
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Build an object from key/value pairs. Later duplicates replace earlier ones.
    pub fn object<I, K, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Value>,
    {
        let mut map = Object::new();
        for (k, v) in entries {
            map.insert(k.into(), v.into());
        }
        Value::Object(map)
    }

    /// An empty array.
    pub fn empty_array() -> Self {
        Value::Array(Vec::new())
    }

    /// An empty object.
    pub fn empty_object() -> Self {
        Value::Object(Object::new())
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::Decimal(_) => Kind::Decimal,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this is a boolean value.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    /// Returns true if this is an integer value.
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    /// Returns true if this is a decimal value.
    pub fn is_decimal(&self) -> bool {
        matches!(self, Value::Decimal(_))
    }

    /// Returns true if this is an integer or a decimal.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Decimal(_))
    }

    /// Returns true if this is a string value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns true if this is an array value.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns true if this is an object value.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns the boolean, or a kind error.
    pub fn as_boolean(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(Error::kind(Kind::Boolean, other.kind())),
        }
    }

    /// Returns the integer, or a kind error. Decimals are not narrowed.
    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(i) => Ok(*i),
            other => Err(Error::kind(Kind::Integer, other.kind())),
        }
    }

    /// Returns the number as a decimal, widening integers.
    pub fn as_decimal(&self) -> Result<f64> {
        match self {
            Value::Decimal(d) => Ok(*d),
            Value::Integer(i) => Ok(*i as f64),
            other => Err(Error::Kind {
                expected: vec![Kind::Decimal, Kind::Integer],
                actual: other.kind(),
            }),
        }
    }

    /// Returns the string contents, or a kind error.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(Error::kind(Kind::String, other.kind())),
        }
    }

    /// Returns the array elements, or a kind error.
    pub fn as_array(&self) -> Result<&Vec<Value>> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(Error::kind(Kind::Array, other.kind())),
        }
    }

    /// Returns the array elements mutably, or a kind error.
    pub fn as_array_mut(&mut self) -> Result<&mut Vec<Value>> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(Error::kind(Kind::Array, other.kind())),
        }
    }

    /// Returns the object map, or a kind error.
    pub fn as_object(&self) -> Result<&Object> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(Error::kind(Kind::Object, other.kind())),
        }
    }

    /// Returns the object map mutably, or a kind error.
    pub fn as_object_mut(&mut self) -> Result<&mut Object> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(Error::kind(Kind::Object, other.kind())),
        }
    }

    /// Lightweight view over the elements of an array.
    pub fn array_view(&self) -> Result<ArrayView<'_>> {
        self.as_array().map(|a| ArrayView::new(a))
    }

    /// Lightweight view over the entries of an object.
    pub fn object_view(&self) -> Result<ObjectView<'_>> {
        self.as_object().map(ObjectView::new)
    }

    /// Look up `key` if this is an object. Non-objects have no keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns true if this is an object containing `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Array element at `index`.
    pub fn at(&self, index: usize) -> Result<&Value> {
        self.as_array()?.get(index).ok_or(Error::NotFound {
            element: PathElement::Index(index),
        })
    }

    /// Object member at `key`.
    pub fn at_key(&self, key: &str) -> Result<&Value> {
        self.as_object()?.get(key).ok_or_else(|| Error::NotFound {
            element: PathElement::Key(key.to_string()),
        })
    }

    /// Child addressed by a single path element.
    pub fn at_element(&self, element: &PathElement) -> Result<&Value> {
        match element {
            PathElement::Index(i) => self.at(*i),
            PathElement::Key(k) => self.at_key(k),
        }
    }

    /// Descendant addressed by `path`. The empty path addresses `self`.
    pub fn at_path(&self, path: &Path) -> Result<&Value> {
        path.iter().try_fold(self, |cur, elem| cur.at_element(elem))
    }

    /// Number of elements, entries or bytes for arrays, objects and strings.
    pub fn len(&self) -> Result<usize> {
        match self {
            Value::Array(a) => Ok(a.len()),
            Value::Object(o) => Ok(o.len()),
            Value::String(s) => Ok(s.len()),
            other => Err(Error::Kind {
                expected: vec![Kind::Array, Kind::Object, Kind::String],
                actual: other.kind(),
            }),
        }
    }

    /// Returns true if an array, object or string has no contents.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|n| n == 0)
    }

    /// Append to an array.
    pub fn push(&mut self, item: impl Into<Value>) -> Result<()> {
        self.as_array_mut()?.push(item.into());
        Ok(())
    }

    /// Insert into an object, returning the replaced value if the key existed.
    pub fn insert(&mut self, key: impl Into<String>, item: impl Into<Value>) -> Result<Option<Value>> {
        Ok(self.as_object_mut()?.insert(key.into(), item.into()))
    }

    /// Remove `key` from an object, preserving the order of the remaining keys.
    pub fn remove_key(&mut self, key: &str) -> Result<Option<Value>> {
        Ok(self.as_object_mut()?.shift_remove(key))
    }

    /// Remove the array element at `index`, shifting later elements down.
    pub fn remove_index(&mut self, index: usize) -> Result<Value> {
        let arr = self.as_array_mut()?;
        if index >= arr.len() {
            return Err(Error::NotFound {
                element: PathElement::Index(index),
            });
        }
        Ok(arr.remove(index))
    }

    /// Replace `self` with null and return the previous value.
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::text::encode(self))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Integer(i64::from(n))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Decimal(d)
    }
}

impl From<f32> for Value {
    fn from(d: f32) -> Self {
        Value::Decimal(f64::from(d))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(map: Object) -> Self {
        Value::Object(map)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::object(iter)
    }
}
