//! Resource limits and policies for text parsing.
//!
//! Every limit bounds work done on untrusted input. Exceeding one fails the
//! parse with the matching [`ParseErrorKind`](crate::error::ParseErrorKind).
//!
//! # Requirements
//!
//! - InputTooLarge: total input size limit
//! - NestingTooDeep: maximum nesting depth
//! - StringTooLong: maximum string length
//! - TooManyFields: maximum object fields
//! - ArrayTooLong: maximum array length
//! - DuplicateKey: only when duplicates are rejected

use serde::{Deserialize, Serialize};

/// What the parser does when an object repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyAction {
    /// The later value replaces the earlier one, keeping the first position
    #[default]
    Replace,
    /// Fail the parse
    Reject,
}

/// Limits and policies for [`parse_with_options`](super::parse_with_options).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Maximum total input size in bytes
    pub max_input_size: u64,
    /// Maximum nesting depth for arrays/objects
    pub max_nesting_depth: u64,
    /// Maximum string length in bytes
    pub max_string_length: u64,
    /// Maximum number of fields in an object
    pub max_object_fields: u64,
    /// Maximum number of elements in an array
    pub max_array_length: u64,
    /// Handling of repeated object keys
    pub duplicate_keys: DuplicateKeyAction,
}

impl ParseOptions {
    /// Tight limits for untrusted input. Duplicate keys are rejected.
    pub const fn strict() -> Self {
        Self {
            max_input_size: 1024 * 1024,  // 1 MiB
            max_nesting_depth: 64,
            max_string_length: 64 * 1024, // 64 KiB
            max_object_fields: 1024,
            max_array_length: 10_000,
            duplicate_keys: DuplicateKeyAction::Reject,
        }
    }

    /// Generous limits for trusted input. Duplicate keys resolve last write wins.
    pub const fn lenient() -> Self {
        Self {
            max_input_size: 64 * 1024 * 1024, // 64 MiB
            max_nesting_depth: 512,
            max_string_length: 16 * 1024 * 1024, // 16 MiB
            max_object_fields: 1_000_000,
            max_array_length: 10_000_000,
            duplicate_keys: DuplicateKeyAction::Replace,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::lenient()
    }
}
