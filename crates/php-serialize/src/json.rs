//! JSON conversion for PHP values.
//!
//! This module converts between `PhpValue` and `serde_json::Value`.
//! Enable the `serde` feature to use this module.

use serde_json::{json, Map, Value as JsonValue};

use crate::encoder::format_float;
use crate::types::{PhpArray, PhpValue};

/// Convert a PHP value to a JSON value.
///
/// The value must not contain itself; decoded values never do.
///
/// # Mapping Rules
///
/// | PHP Type | JSON Type |
/// |----------|-----------|
/// | `null` | `null` |
/// | `bool` | `boolean` |
/// | `int` | `number` |
/// | `float` | `number` (`null` for NaN, `"Infinity"`/`"-Infinity"`) |
/// | `string` / `bytes` | `string` (lossy UTF-8 conversion) |
/// | `array` keyed `0..n-1` in order / `list` | `array` |
/// | other `array` | `object` |
///
/// # Example
///
/// ```rust
/// use php_serialize::{loads, to_json};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = loads(data).unwrap();
/// let json = to_json(&php_value);
/// assert_eq!(json, serde_json::json!({"name": "Alice", "age": 30}));
/// ```
pub fn to_json(value: &PhpValue) -> JsonValue {
    match value {
        PhpValue::Null => JsonValue::Null,
        PhpValue::Bool(b) => JsonValue::Bool(*b),
        PhpValue::Int(i) => json!(*i),
        PhpValue::Float(f) => {
            if f.is_nan() {
                JsonValue::Null
            } else if f.is_infinite() {
                if f.is_sign_positive() {
                    json!("Infinity")
                } else {
                    json!("-Infinity")
                }
            } else {
                json!(*f)
            }
        }
        PhpValue::String(s) => JsonValue::String(s.clone()),
        PhpValue::Bytes(b) => JsonValue::String(String::from_utf8_lossy(b).into_owned()),
        PhpValue::Array(items) => {
            let items = items.borrow();
            match items.to_list() {
                Ok(list) => JsonValue::Array(list.iter().map(to_json).collect()),
                Err(_) => {
                    let mut map = Map::new();
                    for (k, v) in items.iter() {
                        let key = match k {
                            PhpValue::Null => String::new(),
                            PhpValue::Bool(b) => b.to_string(),
                            PhpValue::Int(i) => i.to_string(),
                            PhpValue::Float(f) => format_float(*f),
                            PhpValue::String(s) => s.clone(),
                            PhpValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
                            PhpValue::Array(_) | PhpValue::List(_) => continue,
                        };
                        map.insert(key, to_json(v));
                    }
                    JsonValue::Object(map)
                }
            }
        }
        PhpValue::List(items) => JsonValue::Array(items.borrow().iter().map(to_json).collect()),
    }
}

/// Convert a JSON value to a PHP value.
///
/// Arrays become lists and objects become string-keyed arrays. Numbers that
/// fit an `i64` become integers, all others floats.
///
/// # Example
///
/// ```rust
/// use php_serialize::{dumps, json::from_json};
///
/// let value = from_json(&serde_json::json!({"tags": ["a"]}));
/// assert_eq!(dumps(&value).unwrap(), br#"a:1:{s:4:"tags";a:1:{i:0;s:1:"a";}}"#);
/// ```
pub fn from_json(value: &JsonValue) -> PhpValue {
    match value {
        JsonValue::Null => PhpValue::Null,
        JsonValue::Bool(b) => PhpValue::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => PhpValue::Int(i),
            None => PhpValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => PhpValue::String(s.clone()),
        JsonValue::Array(items) => PhpValue::list(items.iter().map(from_json)),
        JsonValue::Object(map) => PhpValue::from(
            map.iter()
                .map(|(k, v)| (k.as_str(), from_json(v)))
                .collect::<PhpArray>(),
        ),
    }
}

/// Convert a PHP value to a JSON string.
///
/// # Example
///
/// ```rust
/// use php_serialize::{loads, json::to_json_string};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = loads(data).unwrap();
/// let json_str = to_json_string(&php_value).unwrap();
/// // JSON key order is not guaranteed, so check contents
/// assert!(json_str.contains(r#""name":"Alice""#));
/// assert!(json_str.contains(r#""age":30"#));
/// ```
pub fn to_json_string(value: &PhpValue) -> serde_json::Result<String> {
    let json = to_json(value);
    serde_json::to_string(&json)
}

/// Convert a PHP value to a pretty-printed JSON string.
pub fn to_json_string_pretty(value: &PhpValue) -> serde_json::Result<String> {
    let json = to_json(value);
    serde_json::to_string_pretty(&json)
}
