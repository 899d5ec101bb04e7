//! JSON text parsing and encoding.
//!
//! These produce and consume [`Value`](crate::value::Value) trees; the
//! serialization framework itself never touches text.
//!
//! # Architecture
//!
//! - [`options`] - Resource limits and duplicate key policy
//! - [`lexer`] - Tokenizer with UTF-8/escape handling
//! - [`parser`] - Recursive descent parser
//! - [`encode`] - Compact encoder
//!
//! Parsing is all-or-nothing: the first problem fails the parse with a
//! [`ParseError`](crate::error::ParseError) carrying the byte offset.
//!
//! # Example
//!
//! ```
//! use jsonv::text::{encode, parse_str};
//!
//! let value = parse_str(r#"{"b": 2, "a": [1.5, null]}"#).unwrap();
//! assert_eq!(encode(&value), r#"{"b":2,"a":[1.5,null]}"#);
//! ```

pub mod encode;
pub mod lexer;
pub mod options;
pub mod parser;

pub use encode::{encode, encode_to};
pub use options::{DuplicateKeyAction, ParseOptions};
pub use parser::{parse, parse_str, parse_with_options};
