//! Strict encoder and decoder for PHP's serialize format.
//!
//! This crate converts between [`PhpValue`] trees and the byte strings PHP's
//! `serialize()` produces, covering null, booleans, integers, floats, strings
//! and arrays.
//!
//! # Features
//!
//! - **Strict grammar** - Any deviation, including trailing bytes, is an error
//! - **Byte-exact strings** - Length prefixes count UTF-8 bytes, not characters
//! - **No objects** - PHP objects are refused on decode, never instantiated
//! - **Cycle detection** - Self-containing arrays fail to encode instead of recursing forever
//! - **Detailed errors** - Precise error positions, categories and input previews
//!
//! # Quick Start
//!
//! ```rust
//! use php_serialize::{dumps, loads, PhpValue};
//!
//! let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
//! let value = loads(data).unwrap();
//!
//! if let Some(items) = value.as_array() {
//!     for (key, val) in items.iter() {
//!         println!("{} => {}", key, val);
//!     }
//! }
//!
//! assert_eq!(dumps(&value).unwrap(), data);
//! ```
//!
//! # Sequences
//!
//! PHP has one array type, so a list encodes as an array keyed `0..n-1`
//! and always decodes back as an ordered mapping. Use
//! [`PhpArray::to_list`] to recover the sequence:
//!
//! ```rust
//! use php_serialize::{dumps, loads, PhpValue};
//!
//! let encoded = dumps(&PhpValue::list(["a", "b"])).unwrap();
//! assert_eq!(encoded, br#"a:2:{i:0;s:1:"a";i:1;s:1:"b";}"#);
//!
//! let decoded = loads(&encoded).unwrap();
//! let list = decoded.as_array().unwrap().to_list().unwrap();
//! assert_eq!(list, vec![PhpValue::from("a"), PhpValue::from("b")]);
//! ```
//!
//! # Supported Types
//!
//! | PHP Type | Rust Type |
//! |----------|-----------|
//! | `null` | `PhpValue::Null` |
//! | `bool` | `PhpValue::Bool(bool)` |
//! | `int` | `PhpValue::Int(i64)` |
//! | `float` | `PhpValue::Float(f64)` |
//! | `string` | `PhpValue::String(String)` or `PhpValue::Bytes(Vec<u8>)` |
//! | `array` | `PhpValue::Array(Shared<PhpArray>)` or `PhpValue::List(Shared<Vec<PhpValue>>)` |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::inline_always)]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod grammar;
pub mod types;

#[cfg(feature = "serde")]
pub mod json;

pub use decoder::{loads, loads_with_config, Decoder, DecoderConfig, Utf8Mode};
pub use encoder::{
    check_duplicate_keys, dumps, dumps_with_config, format_float, key_to_bytes, Encoder,
    EncoderConfig,
};
pub use error::{Error, ErrorCategory, ErrorKind, Result};
pub use types::{PhpArray, PhpValue, Shared};

#[cfg(feature = "serde")]
pub use json::{from_json, to_json};

/// Whether this implementation is native code.
///
/// Always `true` here. Test suites shared between several implementations
/// of the same codec read it to check which one they are exercising.
pub const COMPILED: bool = true;
