//! Opcodes and delimiters of the PHP serialize wire grammar.
//!
//! ```text
//! value := "N;"
//!        | "b:" ("0" | "1") ";"
//!        | "i:" decimal-int ";"
//!        | "d:" decimal-float ";"
//!        | "s:" decimal-len ":\"" byte{decimal-len} "\";"
//!        | "a:" decimal-count ":{" (value value){decimal-count} "}"
//!        | "O:" ... | "C:" ...
//! ```

/// `N;`
pub const NULL: u8 = b'N';
/// `b:<0|1>;`
pub const BOOL: u8 = b'b';
/// `i:<int>;`
pub const INT: u8 = b'i';
/// `d:<float>;`
pub const FLOAT: u8 = b'd';
/// `s:<len>:"<bytes>";`
pub const STRING: u8 = b's';
/// `a:<count>:{<key><value>...}`
pub const ARRAY: u8 = b'a';
/// Object with properties. Recognized, always rejected.
pub const OBJECT: u8 = b'O';
/// Object with custom `Serializable` payload. Recognized, always rejected.
pub const CUSTOM_OBJECT: u8 = b'C';

/// Follows every opcode and every length or count prefix.
pub const SEPARATOR: u8 = b':';
/// Ends scalar values.
pub const TERMINATOR: u8 = b';';
/// Wraps string payloads.
pub const QUOTE: u8 = b'"';
/// Opens array entries.
pub const OPEN_BRACE: u8 = b'{';
/// Closes array entries.
pub const CLOSE_BRACE: u8 = b'}';

/// Float tokens PHP writes for non-finite values.
pub const INF: &str = "INF";
/// See [`INF`].
pub const NEG_INF: &str = "-INF";
/// See [`INF`].
pub const NAN: &str = "NAN";

/// Whether `opcode` denotes a PHP object.
#[inline]
pub fn is_object(opcode: u8) -> bool {
    matches!(opcode, OBJECT | CUSTOM_OBJECT)
}
