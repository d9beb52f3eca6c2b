//! PHP serialize encoder.
//!
//! Output is deterministic: a value tree always produces the same bytes.
//! Mapping keys are always written as PHP strings; sequence indices are
//! written as PHP integers.

use std::borrow::Cow;
use std::collections::HashSet;
use std::rc::Rc;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace};

use crate::error::{Error, ErrorKind, Result};
use crate::grammar;
use crate::types::{PhpArray, PhpValue, Shared};

/// Encoder configuration options.
#[derive(Debug, Clone, Default)]
pub struct EncoderConfig {
    /// Fail when two keys of one mapping coerce to the same bytes,
    /// for example `Int(1)` and `String("1")`.
    pub reject_duplicate_keys: bool,
}

/// A PHP serialize encoder.
///
/// Owns the output buffer and the set of composites currently being
/// written; both live for one [`encode`](Encoder::encode) call.
pub struct Encoder {
    out: Vec<u8>,
    /// Identities of the arrays and lists on the active recursion path.
    active: HashSet<*const ()>,
    config: EncoderConfig,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Create a new encoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    /// Create a new encoder with custom configuration.
    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            out: Vec::new(),
            active: HashSet::new(),
            config,
        }
    }

    /// Encode one value, consuming the encoder.
    #[cfg_attr(feature = "tracing", instrument(skip_all, fields(value_type = value.type_name())))]
    pub fn encode(mut self, value: &PhpValue) -> Result<Vec<u8>> {
        self.encode_value(value)?;

        #[cfg(feature = "tracing")]
        debug!(encoded_len = self.out.len(), "Encode completed");

        Ok(self.out)
    }

    fn encode_value(&mut self, value: &PhpValue) -> Result<()> {
        match value {
            PhpValue::String(s) => self.write_string(s.as_bytes()),
            PhpValue::Int(i) => self.write_int(*i),
            PhpValue::Float(f) => {
                self.write_scalar(grammar::FLOAT, format_float(*f).as_bytes());
            }
            PhpValue::Bytes(b) => self.write_string(b),
            PhpValue::Bool(b) => {
                self.write_scalar(grammar::BOOL, if *b { b"1" } else { b"0" });
            }
            PhpValue::Null => {
                self.out.push(grammar::NULL);
                self.out.push(grammar::TERMINATOR);
            }
            PhpValue::Array(array) => self.encode_array(array)?,
            PhpValue::List(list) => self.encode_list(list)?,
        }
        Ok(())
    }

    /// `a:<n>:{s:<key>;<value>...}`, keys coerced to byte strings.
    fn encode_array(&mut self, array: &Shared<PhpArray>) -> Result<()> {
        let id = self.enter(array, "array")?;
        let entries = array.borrow();

        #[cfg(feature = "tracing")]
        trace!(len = entries.len(), depth = self.active.len(), "Encoding array");

        let keys = entries
            .keys()
            .map(key_to_bytes)
            .collect::<Result<Vec<_>>>()?;

        if self.config.reject_duplicate_keys {
            let mut sorted: Vec<(&[u8], ())> = keys.iter().map(|k| (k.as_ref(), ())).collect();
            sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
            check_duplicate_keys(sorted.as_slice())?;
        }

        self.write_header(entries.len());
        for (key, value) in keys.iter().zip(entries.values()) {
            self.write_string(key);
            self.encode_value(value)?;
        }
        self.out.push(grammar::CLOSE_BRACE);

        self.leave(id);
        Ok(())
    }

    /// `a:<n>:{i:0;<value>i:1;<value>...}`
    fn encode_list(&mut self, list: &Shared<Vec<PhpValue>>) -> Result<()> {
        let id = self.enter(list, "list")?;
        let items = list.borrow();

        #[cfg(feature = "tracing")]
        trace!(len = items.len(), depth = self.active.len(), "Encoding list");

        self.write_header(items.len());
        for (index, item) in items.iter().enumerate() {
            // Vec lengths never exceed isize::MAX
            self.write_int(index as i64);
            self.encode_value(item)?;
        }
        self.out.push(grammar::CLOSE_BRACE);

        self.leave(id);
        Ok(())
    }

    /// Mark a composite as being written, failing if it already is.
    fn enter<T>(&mut self, composite: &Shared<T>, type_name: &'static str) -> Result<*const ()> {
        let id = Rc::as_ptr(composite).cast::<()>();
        if !self.active.insert(id) {
            return Err(Error::from(ErrorKind::CircularReference(type_name)));
        }
        Ok(id)
    }

    fn leave(&mut self, id: *const ()) {
        self.active.remove(&id);
    }

    fn write_header(&mut self, len: usize) {
        self.out.push(grammar::ARRAY);
        self.out.push(grammar::SEPARATOR);
        self.out.extend_from_slice(len.to_string().as_bytes());
        self.out.push(grammar::SEPARATOR);
        self.out.push(grammar::OPEN_BRACE);
    }

    fn write_int(&mut self, value: i64) {
        self.write_scalar(grammar::INT, value.to_string().as_bytes());
    }

    /// `<op>:<raw>;`
    fn write_scalar(&mut self, opcode: u8, raw: &[u8]) {
        self.out.push(opcode);
        self.out.push(grammar::SEPARATOR);
        self.out.extend_from_slice(raw);
        self.out.push(grammar::TERMINATOR);
    }

    /// `s:<len>:"<bytes>";` with the length in bytes.
    fn write_string(&mut self, bytes: &[u8]) {
        self.out.push(grammar::STRING);
        self.out.push(grammar::SEPARATOR);
        self.out.extend_from_slice(bytes.len().to_string().as_bytes());
        self.out.push(grammar::SEPARATOR);
        self.out.push(grammar::QUOTE);
        self.out.extend_from_slice(bytes);
        self.out.push(grammar::QUOTE);
        self.out.push(grammar::TERMINATOR);
    }
}

/// Coerce a mapping key to the bytes it is written as.
///
/// Bytes pass through, text is UTF-8, integers use their decimal form and
/// null becomes the empty string. Booleans, floats, arrays and lists have
/// no key form.
pub fn key_to_bytes(key: &PhpValue) -> Result<Cow<'_, [u8]>> {
    match key {
        PhpValue::Bytes(b) => Ok(Cow::Borrowed(b.as_slice())),
        PhpValue::String(s) => Ok(Cow::Borrowed(s.as_bytes())),
        PhpValue::Int(i) => Ok(Cow::Owned(i.to_string().into_bytes())),
        PhpValue::Null => Ok(Cow::Borrowed(b"")),
        PhpValue::Bool(_) | PhpValue::Float(_) | PhpValue::Array(_) | PhpValue::List(_) => {
            Err(Error::from(ErrorKind::UnsupportedKey(key.type_name()))
                .with_context("expected bytes, string, integer or null as array key"))
        }
    }
}

/// Fail if two adjacent keys of a key-sorted slice are equal.
///
/// Not part of the default encode path; enable
/// [`EncoderConfig::reject_duplicate_keys`] or call it directly.
pub fn check_duplicate_keys<K: AsRef<[u8]>, V>(sorted: &[(K, V)]) -> Result<()> {
    for pair in sorted.windows(2) {
        let (last, current) = (pair[0].0.as_ref(), pair[1].0.as_ref());
        if last == current {
            return Err(Error::from(ErrorKind::DuplicateKey(
                String::from_utf8_lossy(current).into_owned(),
            )));
        }
    }
    Ok(())
}

/// Render a float the way the encoder writes it.
///
/// Finite values use the shortest text that parses back to the same `f64`;
/// non-finite values use PHP's `INF`, `-INF` and `NAN`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        grammar::NAN.to_owned()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            grammar::INF.to_owned()
        } else {
            grammar::NEG_INF.to_owned()
        }
    } else {
        format!("{:?}", value)
    }
}

/// Encode a value into PHP serialize format.
///
/// # Example
///
/// ```rust
/// use php_serialize::{dumps, PhpValue};
///
/// let value = PhpValue::array([("a", PhpValue::Int(1)), ("b", PhpValue::list([1, 2]))]);
/// assert_eq!(
///     dumps(&value).unwrap(),
///     br#"a:2:{s:1:"a";i:1;s:1:"b";a:2:{i:0;i:1;i:1;i:2;}}"#
/// );
/// ```
#[inline]
pub fn dumps(value: &PhpValue) -> Result<Vec<u8>> {
    Encoder::new().encode(value)
}

/// Encode a value with custom configuration.
#[inline]
pub fn dumps_with_config(value: &PhpValue, config: EncoderConfig) -> Result<Vec<u8>> {
    Encoder::with_config(config).encode(value)
}
