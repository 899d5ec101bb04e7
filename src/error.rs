//! Error taxonomy for value access, registry configuration and conversion.
//!
//! Every failure the crate can report is a variant of [`Error`]. Each variant
//! has a stable numeric [`Error::code`] and a symbolic [`Error::name`], so
//! callers can match on codes without depending on message text.
//!
//! # Propagation
//!
//! - Value-level failures ([`Error::Kind`], [`Error::NotFound`]) carry no path.
//! - Extraction re-tags any pathless failure as [`Error::Extraction`] at the
//!   location where it was observed and keeps the original as its cause.
//! - Serialization failures that depend on the produced tree surface as
//!   [`Error::Validation`], which carries a code, a path and the value.
//! - Nothing is retried and partial results are never returned.

use std::fmt;

use thiserror::Error;

use crate::path::{Path, PathElement};
use crate::serialization::TypeInfo;
use crate::value::{Kind, Value};

/// Result type for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors reported by the crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A value had the wrong kind for the requested operation (code 100).
    #[error("unexpected kind: expected {}, found {actual}", join_kinds(.expected))]
    Kind {
        /// Kinds that would have been accepted
        expected: Vec<Kind>,
        /// Kind that was actually found
        actual: Kind,
    },

    /// An index or key was not present (code 101).
    #[error("no element at {element}")]
    NotFound {
        /// The missing element
        element: PathElement,
    },

    /// No extractor is registered for a type (code 110).
    #[error("Could not find extractor for type: {type_info}")]
    NoExtractor {
        /// The type that was requested
        type_info: TypeInfo,
    },

    /// No serializer is registered for a type (code 111).
    #[error("Could not find serializer for type: {type_info}")]
    NoSerializer {
        /// The type that was requested
        type_info: TypeInfo,
    },

    /// A type was registered twice in the same layer (code 112).
    #[error("Already have {role} for type {type_info}")]
    DuplicateType {
        /// Which capability collided
        role: Role,
        /// The type that was registered twice
        type_info: TypeInfo,
    },

    /// Extraction failed at a location in the input (code 120).
    #[error("extraction error at {path}: {message}")]
    Extraction {
        /// Location of the offending sub-value
        path: Path,
        /// Human readable description
        message: String,
        /// Failure this one was derived from
        #[source]
        cause: Option<Box<Error>>,
    },

    /// A serialized tree violated a value-level rule (code 130).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Types referenced by builder declarations have no adapter (code 140).
    #[error("{}", describe_unresolved(.missing))]
    UnresolvedReferences {
        /// Each unresolved type with the types that reference it
        missing: Vec<UnresolvedReference>,
    },

    /// Text input could not be parsed (code 150).
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Text could not be parsed as a path (code 160).
    #[error("invalid path {text:?} at offset {offset}")]
    InvalidPath {
        /// The rejected text
        text: String,
        /// Byte offset of the first offending character
        offset: usize,
    },

    /// Failure raised by application code inside a custom adapter or hook (code 199).
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Get the numeric error code.
    pub fn code(&self) -> u32 {
        match self {
            Error::Kind { .. } => 100,
            Error::NotFound { .. } => 101,
            Error::NoExtractor { .. } => 110,
            Error::NoSerializer { .. } => 111,
            Error::DuplicateType { .. } => 112,
            Error::Extraction { .. } => 120,
            Error::Validation(_) => 130,
            Error::UnresolvedReferences { .. } => 140,
            Error::Parse(_) => 150,
            Error::InvalidPath { .. } => 160,
            Error::Custom(_) => 199,
        }
    }

    /// Get the symbolic error name.
    pub fn name(&self) -> &'static str {
        match self {
            Error::Kind { .. } => "kind_error",
            Error::NotFound { .. } => "not_found",
            Error::NoExtractor { .. } => "no_extractor",
            Error::NoSerializer { .. } => "no_serializer",
            Error::DuplicateType { .. } => "duplicate_type_error",
            Error::Extraction { .. } => "extraction_error",
            Error::Validation(_) => "validation_error",
            Error::UnresolvedReferences { .. } => "unresolved_references",
            Error::Parse(_) => "parse_error",
            Error::InvalidPath { .. } => "invalid_path",
            Error::Custom(_) => "custom",
        }
    }

    /// Build a kind error for a single expected kind.
    pub fn kind(expected: Kind, actual: Kind) -> Self {
        Error::Kind {
            expected: vec![expected],
            actual,
        }
    }

    /// Build an application-defined error.
    pub fn custom(message: impl Into<String>) -> Self {
        Error::Custom(message.into())
    }

    /// Build an extraction error without an underlying cause.
    pub fn extraction(path: Path, message: impl Into<String>) -> Self {
        Error::Extraction {
            path,
            message: message.into(),
            cause: None,
        }
    }

    /// Tag `self` with `path` unless it already carries one.
    pub fn at_path(self, path: &Path) -> Self {
        match self {
            Error::Extraction { .. } => self,
            cause => {
                tracing::trace!(path = %path, code = cause.code(), "tagging extraction failure");
                Error::Extraction {
                    path: path.clone(),
                    message: cause.to_string(),
                    cause: Some(Box::new(cause)),
                }
            }
        }
    }

    /// Returns the path carried by an extraction or validation error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::Extraction { path, .. } => Some(path),
            Error::Validation(e) => Some(&e.path),
            _ => None,
        }
    }

    /// Returns the directly nested cause, if any.
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Error::Extraction { cause, .. } => cause.as_deref(),
            _ => None,
        }
    }

    /// Walk the cause chain to the innermost error.
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Some(next) = current.cause() {
            current = next;
        }
        current
    }
}

/// The capability involved in a duplicate registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// An extractor
    Extractor,
    /// A serializer
    Serializer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Extractor => f.write_str("an extractor"),
            Role::Serializer => f.write_str("a serializer"),
        }
    }
}

/// A type referenced by a declaration that the formats cannot handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Display name of the missing type
    pub type_name: String,
    /// Display names of the types that reference it
    pub referenced_by: Vec<String>,
}

/// Codes carried by [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCode {
    /// A decimal was NaN or infinite
    NonFiniteNumber,
    /// A polymorphic subtype did not serialize to an object
    SubtypeNotObject,
    /// A checked discriminator key was absent from the output
    DiscriminatorMissing,
    /// A checked discriminator key had the wrong value
    DiscriminatorMismatch,
    /// An inserted discriminator key was already present
    DiscriminatorPresent,
    /// A pointer was empty and null output is not permitted
    NullPointer,
}

impl ValidationCode {
    /// Returns the human readable description of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::NonFiniteNumber => "non-finite number",
            ValidationCode::SubtypeNotObject => "subtype did not serialize to an object",
            ValidationCode::DiscriminatorMissing => "discriminator key missing",
            ValidationCode::DiscriminatorMismatch => "discriminator value mismatch",
            ValidationCode::DiscriminatorPresent => "discriminator key already present",
            ValidationCode::NullPointer => "null pointer",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A serialization-time semantic violation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{code} at {path}: {value}")]
pub struct ValidationError {
    /// What rule was violated
    pub code: ValidationCode,
    /// Where in the produced tree the violation is
    pub path: Path,
    /// The offending value
    pub value: Value,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(code: ValidationCode, path: Path, value: Value) -> Self {
        Self { code, path, value }
    }
}

/// Reasons the text parser rejects input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Malformed JSON syntax
    #[error("invalid JSON")]
    InvalidJson,
    /// Malformed UTF-8 or an unpaired surrogate
    #[error("invalid UTF-8")]
    InvalidUtf8,
    /// Input exceeds the size limit (size, limit)
    #[error("input too large ({0} > {1})")]
    InputTooLarge(u64, u64),
    /// Nesting exceeds the depth limit (depth, limit)
    #[error("nesting too deep ({0} > {1})")]
    NestingTooDeep(u64, u64),
    /// A string exceeds the length limit (length, limit)
    #[error("string too long ({0} > {1})")]
    StringTooLong(u64, u64),
    /// An object exceeds the field limit (fields, limit)
    #[error("too many fields ({0} > {1})")]
    TooManyFields(u64, u64),
    /// An array exceeds the length limit (length, limit)
    #[error("array too long ({0} > {1})")]
    ArrayTooLong(u64, u64),
    /// An object repeated a key and duplicates are rejected
    #[error("duplicate key {0:?}")]
    DuplicateKey(String),
    /// A number literal could not be represented
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

impl ParseErrorKind {
    /// Get the numeric code of this parse failure.
    pub fn code(&self) -> u32 {
        match self {
            ParseErrorKind::InvalidJson => 150,
            ParseErrorKind::InvalidUtf8 => 151,
            ParseErrorKind::InputTooLarge(..) => 152,
            ParseErrorKind::NestingTooDeep(..) => 153,
            ParseErrorKind::StringTooLong(..) => 154,
            ParseErrorKind::TooManyFields(..) => 155,
            ParseErrorKind::ArrayTooLong(..) => 156,
            ParseErrorKind::DuplicateKey(_) => 157,
            ParseErrorKind::InvalidNumber(_) => 158,
        }
    }
}

/// A parse failure with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    /// What went wrong
    pub kind: ParseErrorKind,
    /// Byte offset into the input
    pub offset: usize,
}

impl ParseError {
    /// Create a parse error at `offset`.
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

fn join_kinds(kinds: &[Kind]) -> String {
    kinds
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(" or ")
}

fn describe_unresolved(missing: &[UnresolvedReference]) -> String {
    let mut out = if missing.len() == 1 {
        String::from("There is 1 type referenced that the formats do not know how to serialize:")
    } else {
        format!(
            "There are {} types referenced that the formats do not know how to serialize:",
            missing.len()
        )
    };
    for entry in missing {
        out.push_str("\n - ");
        out.push_str(&entry.type_name);
        out.push_str(" (referenced by: ");
        out.push_str(&entry.referenced_by.join(", "));
        out.push(')');
    }
    out
}
