//! Strict PHP unserialize decoder.
//!
//! A recursive-descent decoder with one byte of lookahead: every value starts
//! with an opcode, and the opcode alone decides how the rest is read. Any
//! deviation from the grammar fails the whole call; there is no recovery.
//!
//! # Tracing Support
//!
//! Enable the `tracing` feature for decode instrumentation:
//!
//! ```toml
//! php-serialize = { version = "0.1", features = ["tracing"] }
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use memchr::memchr;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace};

use crate::error::{Error, ErrorKind, Result};
use crate::grammar;
use crate::types::{PhpArray, PhpValue};

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 512;

/// What to do with string payloads that are not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Utf8Mode {
    /// Fail the decode with [`ErrorKind::InvalidUtf8`].
    #[default]
    Strict,
    /// Replace invalid sequences with U+FFFD.
    Replace,
    /// Keep the payload as [`PhpValue::Bytes`].
    Bytes,
}

/// Decoder configuration options.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum number of nested arrays. A value holding exactly this many
    /// levels decodes; one more is [`ErrorKind::MaxDepthExceeded`].
    pub max_depth: usize,
    /// Handling of string payloads that are not valid UTF-8.
    pub utf8: Utf8Mode,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            utf8: Utf8Mode::Strict,
        }
    }
}

/// A PHP unserialize decoder over a complete input buffer.
///
/// The read cursor belongs to this instance; decode independent inputs with
/// independent decoders.
pub struct Decoder<'a> {
    /// Input data.
    data: &'a [u8],
    /// Current position in the input.
    pos: usize,
    /// Decoder configuration.
    config: DecoderConfig,
    /// Current nesting depth.
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder with default configuration.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, DecoderConfig::default())
    }

    /// Create a new decoder with custom configuration.
    pub fn with_config(data: &'a [u8], config: DecoderConfig) -> Self {
        Self {
            data,
            pos: 0,
            config,
            depth: 0,
        }
    }

    /// Current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Decode exactly one value and require that the input ends right after it.
    #[cfg_attr(feature = "tracing", instrument(skip(self), fields(data_len = self.data.len())))]
    pub fn decode(&mut self) -> Result<PhpValue> {
        #[cfg(feature = "tracing")]
        debug!(data_len = self.data.len(), "Starting PHP unserialize");

        let value = self.decode_value()?;

        if self.pos < self.data.len() {
            return Err(Error::new(
                ErrorKind::TrailingData(self.data.len() - self.pos),
                self.pos,
            )
            .with_input_preview(self.data, self.pos));
        }

        #[cfg(feature = "tracing")]
        debug!(value_type = value.type_name(), "Decode completed");

        Ok(value)
    }

    /// Decode a single value at the current position.
    #[cfg_attr(feature = "tracing", instrument(skip(self), level = "trace", fields(pos = self.pos, depth = self.depth)))]
    fn decode_value(&mut self) -> Result<PhpValue> {
        let opcode_pos = self.pos;
        let opcode = self.read_byte()?;

        #[cfg(feature = "tracing")]
        trace!(opcode = %char::from(opcode), pos = opcode_pos, "Decoding value");

        match opcode {
            grammar::NULL => {
                self.expect_byte(grammar::TERMINATOR)?;
                Ok(PhpValue::Null)
            }
            grammar::BOOL => self.decode_bool(),
            grammar::INT => self.decode_int(),
            grammar::FLOAT => self.decode_float(),
            grammar::STRING => self.decode_string(),
            grammar::ARRAY => self.decode_array(opcode_pos),
            op if grammar::is_object(op) => {
                Err(Error::new(ErrorKind::ObjectNotAllowed(char::from(op)), opcode_pos))
            }
            op => Err(Error::new(ErrorKind::UnknownOpcode(char::from(op)), opcode_pos)
                .with_input_preview(self.data, opcode_pos)),
        }
    }

    /// `b:<0|1>;` where anything but `0` reads as true.
    fn decode_bool(&mut self) -> Result<PhpValue> {
        self.expect_byte(grammar::SEPARATOR)?;
        let raw = self.read_until(grammar::TERMINATOR)?;
        Ok(PhpValue::Bool(raw != b"0"))
    }

    /// `i:<value>;`
    fn decode_int(&mut self) -> Result<PhpValue> {
        self.expect_byte(grammar::SEPARATOR)?;
        let start = self.pos;
        let raw = self.read_until(grammar::TERMINATOR)?;
        let text = ascii(raw);

        text.parse::<i64>()
            .map(PhpValue::Int)
            .map_err(|_| Error::new(ErrorKind::InvalidInteger(text.to_string()), start))
    }

    /// `d:<value>;`
    fn decode_float(&mut self) -> Result<PhpValue> {
        self.expect_byte(grammar::SEPARATOR)?;
        let start = self.pos;
        let raw = self.read_until(grammar::TERMINATOR)?;
        let text = ascii(raw);

        let value = match text {
            grammar::INF => f64::INFINITY,
            grammar::NEG_INF => f64::NEG_INFINITY,
            grammar::NAN => f64::NAN,
            _ => text
                .parse()
                .map_err(|_| Error::new(ErrorKind::InvalidFloat(text.to_string()), start))?,
        };
        Ok(PhpValue::Float(value))
    }

    /// `s:<len>:"<bytes>";` where `len` counts bytes, not characters.
    fn decode_string(&mut self) -> Result<PhpValue> {
        self.expect_byte(grammar::SEPARATOR)?;
        let len = self.read_length()?;
        self.expect_byte(grammar::QUOTE)?;

        let start = self.pos;
        let available = self.data.len() - start;
        if len > available {
            return Err(Error::new(
                ErrorKind::StringLengthMismatch {
                    expected: len,
                    found: available,
                },
                start,
            ));
        }
        let payload = &self.data[start..start + len];
        self.pos += len;

        self.expect_byte(grammar::QUOTE)?;
        self.expect_byte(grammar::TERMINATOR)?;

        self.string_value(payload, start)
    }

    /// `a:<count>:{<key><value>...}`
    ///
    /// Keys are stored as decoded; a repeated key keeps its first position
    /// and takes the last value.
    fn decode_array(&mut self, opcode_pos: usize) -> Result<PhpValue> {
        if self.depth >= self.config.max_depth {
            return Err(Error::new(
                ErrorKind::MaxDepthExceeded(self.config.max_depth),
                opcode_pos,
            ));
        }

        self.expect_byte(grammar::SEPARATOR)?;
        let count = self.read_length()?;
        self.expect_byte(grammar::OPEN_BRACE)?;

        self.depth += 1;
        // Cap initial allocation; the count is untrusted
        let mut array = PhpArray::with_capacity(count.min(1024));

        for _ in 0..count {
            let key_pos = self.pos;
            let key = self.decode_value()?;
            if matches!(key, PhpValue::Array(_) | PhpValue::List(_)) {
                return Err(Error::new(ErrorKind::InvalidArrayKey(key.type_name()), key_pos)
                    .with_input_preview(self.data, key_pos));
            }
            let value = self.decode_value()?;

            if array.insert(key, value).is_some() {
                #[cfg(feature = "tracing")]
                trace!(pos = key_pos, "Duplicate array key, keeping last value");
            }
        }

        self.depth -= 1;
        self.expect_byte(grammar::CLOSE_BRACE)?;

        Ok(PhpValue::Array(Rc::new(RefCell::new(array))))
    }

    /// Turn a string payload into a value according to the UTF-8 mode.
    fn string_value(&self, payload: &[u8], start: usize) -> Result<PhpValue> {
        match std::str::from_utf8(payload) {
            Ok(text) => Ok(PhpValue::String(text.to_owned())),
            Err(e) => match self.config.utf8 {
                Utf8Mode::Strict => Err(Error::new(ErrorKind::InvalidUtf8, start + e.valid_up_to())
                    .with_input_preview(self.data, start + e.valid_up_to())),
                Utf8Mode::Replace => Ok(PhpValue::String(
                    String::from_utf8_lossy(payload).into_owned(),
                )),
                Utf8Mode::Bytes => Ok(PhpValue::Bytes(payload.to_vec())),
            },
        }
    }

    // Helper methods - marked #[inline] for performance on hot paths

    /// Read a decimal length or count prefix terminated by `:`.
    #[inline]
    fn read_length(&mut self) -> Result<usize> {
        let start = self.pos;
        let raw = self.read_until(grammar::SEPARATOR)?;
        let text = ascii(raw);
        text.parse()
            .map_err(|_| Error::new(ErrorKind::InvalidLength(text.to_string()), start))
    }

    /// Peek at the current byte without consuming it.
    #[inline(always)]
    fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::UnexpectedEof, self.pos))
    }

    /// Read and consume the current byte.
    #[inline(always)]
    fn read_byte(&mut self) -> Result<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Expect a specific byte, returning an error if it doesn't match.
    #[inline]
    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        let byte = self.read_byte()?;
        if byte != expected {
            return Err(self.make_unexpected_char_error(expected, byte));
        }
        Ok(())
    }

    /// Create an unexpected character error with proper context.
    #[cold]
    #[inline(never)]
    fn make_unexpected_char_error(&self, expected: u8, found: u8) -> Error {
        Error::new(
            ErrorKind::UnexpectedChar {
                expected: char::from(expected),
                found: char::from(found),
            },
            self.pos - 1,
        )
        .with_input_preview(self.data, self.pos.saturating_sub(1))
    }

    /// Read bytes up to the delimiter and consume the delimiter.
    #[inline]
    fn read_until(&mut self, delimiter: u8) -> Result<&'a [u8]> {
        let start = self.pos;
        match memchr(delimiter, &self.data[start..]) {
            Some(offset) => {
                let result = &self.data[start..start + offset];
                self.pos = start + offset + 1;
                Ok(result)
            }
            None => Err(Error::new(ErrorKind::UnexpectedEof, self.data.len())
                .with_context(format!("looking for '{}'", char::from(delimiter)))),
        }
    }
}

/// View a numeric token as text; non-ASCII bytes make it unparseable anyway.
fn ascii(raw: &[u8]) -> &str {
    std::str::from_utf8(raw).unwrap_or("<non-ascii>")
}

/// Decode PHP serialized data.
///
/// Text input is accepted as a convenience and decoded from its UTF-8 bytes.
///
/// # Example
///
/// ```rust
/// use php_serialize::loads;
///
/// let value = loads(b"i:42;").unwrap();
/// assert_eq!(value.as_int(), Some(42));
///
/// let value = loads("s:6:\"h\u{e9}llo\";").unwrap();
/// assert_eq!(value.as_str(), Some("h\u{e9}llo"));
/// ```
#[inline]
pub fn loads<T: AsRef<[u8]> + ?Sized>(data: &T) -> Result<PhpValue> {
    Decoder::new(data.as_ref()).decode()
}

/// Decode PHP serialized data with custom configuration.
///
/// # Example
///
/// ```rust
/// use php_serialize::{loads_with_config, DecoderConfig, PhpValue, Utf8Mode};
///
/// let config = DecoderConfig {
///     utf8: Utf8Mode::Bytes,
///     ..Default::default()
/// };
/// let value = loads_with_config(b"s:1:\"\xff\";", config).unwrap();
/// assert_eq!(value, PhpValue::Bytes(vec![0xff]));
/// ```
#[inline]
pub fn loads_with_config<T: AsRef<[u8]> + ?Sized>(data: &T, config: DecoderConfig) -> Result<PhpValue> {
    Decoder::with_config(data.as_ref(), config).decode()
}
