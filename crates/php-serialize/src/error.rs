//! Error types for PHP serialize encoding and decoding.
//!
//! Every error carries an [`ErrorKind`], and every kind belongs to one
//! [`ErrorCategory`]. Decode errors also record the byte position where the
//! input went wrong and a short preview of the surrounding bytes.

use std::fmt;

use bstr::ByteSlice;
use thiserror::Error;

/// The main error type for PHP serialize encoding and decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// The byte position in the input where a decode error occurred.
    pub position: Option<usize>,
    /// Optional context about what was being processed.
    pub context: Option<String>,
    /// Preview of input around the error position for debugging.
    pub input_preview: Option<String>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(position) = self.position {
            write!(f, " at position {}", position)?;
        }
        if let Some(ref ctx) = self.context {
            write!(f, " ({})", ctx)?;
        }
        if let Some(ref preview) = self.input_preview {
            write!(f, "\n{}", preview)?;
        }
        Ok(())
    }
}

/// The broad class an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed input during decode.
    Format,
    /// Input that parses but is deliberately refused: PHP objects on
    /// decode, circular references and duplicate keys on encode.
    Policy,
    /// A mapping key of a type that cannot become a PHP array key.
    Type,
    /// A decoded array that does not have the shape a helper asked for.
    Value,
}

/// Specific kinds of encode and decode errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Expected a specific delimiter but found something else.
    #[error("expected '{expected}', found '{found}'")]
    UnexpectedChar {
        /// The delimiter that was expected.
        expected: char,
        /// The byte that was found.
        found: char,
    },

    /// Opcode byte outside the recognized set.
    #[error("unexpected opcode '{0}'")]
    UnknownOpcode(char),

    /// Invalid integer value.
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Invalid float value.
    #[error("invalid float: {0}")]
    InvalidFloat(String),

    /// Invalid length or item-count prefix.
    #[error("invalid length prefix: {0}")]
    InvalidLength(String),

    /// Fewer payload bytes than the string length prefix announced.
    #[error("string length mismatch: expected {expected}, found {found}")]
    StringLengthMismatch {
        /// The declared string length in bytes.
        expected: usize,
        /// The number of bytes actually available.
        found: usize,
    },

    /// String payload is not valid UTF-8.
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,

    /// Array key decoded to something other than an integer or a string.
    #[error("invalid array key type: {0}")]
    InvalidArrayKey(&'static str),

    /// Bytes left over after the top-level value.
    #[error("extra data: {0} trailing bytes")]
    TrailingData(usize),

    /// Nesting depth exceeded.
    #[error("maximum nesting depth ({0}) exceeded")]
    MaxDepthExceeded(usize),

    /// PHP object opcode (`O` or `C`).
    #[error("deserializing php object '{0}' is not allowed")]
    ObjectNotAllowed(char),

    /// A composite contains itself.
    #[error("circular reference found in {0}")]
    CircularReference(&'static str),

    /// Two mapping keys coerce to the same byte string.
    #[error("duplicated key {0:?}")]
    DuplicateKey(String),

    /// Mapping key of a type that has no PHP key form.
    #[error("unsupported key type: {0}")]
    UnsupportedKey(&'static str),

    /// Array keys are not exactly `0..n-1`.
    #[error("array is not a sequence")]
    NotASequence,
}

impl ErrorKind {
    /// The category this kind belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::UnexpectedEof
            | ErrorKind::UnexpectedChar { .. }
            | ErrorKind::UnknownOpcode(_)
            | ErrorKind::InvalidInteger(_)
            | ErrorKind::InvalidFloat(_)
            | ErrorKind::InvalidLength(_)
            | ErrorKind::StringLengthMismatch { .. }
            | ErrorKind::InvalidUtf8
            | ErrorKind::InvalidArrayKey(_)
            | ErrorKind::TrailingData(_)
            | ErrorKind::MaxDepthExceeded(_) => ErrorCategory::Format,
            ErrorKind::ObjectNotAllowed(_)
            | ErrorKind::CircularReference(_)
            | ErrorKind::DuplicateKey(_) => ErrorCategory::Policy,
            ErrorKind::UnsupportedKey(_) => ErrorCategory::Type,
            ErrorKind::NotASequence => ErrorCategory::Value,
        }
    }
}

impl Error {
    /// Create a decode error with the given kind and position.
    #[inline]
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Self {
            kind,
            position: Some(position),
            context: None,
            input_preview: None,
        }
    }

    /// Create an error that is not tied to an input position.
    #[inline]
    pub fn without_position(kind: ErrorKind) -> Self {
        Self {
            kind,
            position: None,
            context: None,
            input_preview: None,
        }
    }

    /// The category of this error.
    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Whether the input was malformed.
    pub fn is_format(&self) -> bool {
        self.category() == ErrorCategory::Format
    }

    /// Whether the input was refused on purpose.
    pub fn is_policy(&self) -> bool {
        self.category() == ErrorCategory::Policy
    }

    /// Add context to the error.
    #[inline]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add input preview around the error position for debugging.
    ///
    /// Shows up to 20 bytes before and after the error position.
    #[cold]
    pub fn with_input_preview(mut self, data: &[u8], error_pos: usize) -> Self {
        let start = error_pos.saturating_sub(20).min(data.len());
        let end = (error_pos + 20).min(data.len());

        if start < end {
            let preview = data[start..end].to_str_lossy();

            // Caret goes under the offending byte
            let relative_pos = error_pos.saturating_sub(start);
            let mut result = String::with_capacity(preview.len() + relative_pos + 2);
            result.push_str(&preview);
            result.push('\n');
            result.push_str(&" ".repeat(relative_pos));
            result.push('^');

            self.input_preview = Some(result);
        }
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::without_position(kind)
    }
}

/// Result type alias for PHP serialize operations.
pub type Result<T> = std::result::Result<T, Error>;
