//! PHP value types.

use std::cell::{Ref, RefCell};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use bstr::BStr;

use crate::error::{Error, ErrorKind, Result};

/// A reference-counted, mutable composite.
///
/// The `Rc` allocation is the composite's identity: the encoder tracks it to
/// detect values that contain themselves.
pub type Shared<T> = Rc<RefCell<T>>;

/// A PHP value that can be serialized or was deserialized.
///
/// `Debug`, `PartialEq` and `Display` walk the whole tree and will not
/// terminate on a cyclic value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PhpValue {
    /// PHP null value.
    #[default]
    Null,

    /// PHP boolean value.
    Bool(bool),

    /// PHP integer value.
    Int(i64),

    /// PHP float/double value.
    Float(f64),

    /// Text. Written as a PHP string holding its UTF-8 bytes.
    String(String),

    /// Raw bytes. Written as a PHP string holding exactly these bytes.
    Bytes(Vec<u8>),

    /// Ordered mapping. Decoding always produces this for PHP arrays.
    Array(Shared<PhpArray>),

    /// Ordered sequence. Written as a PHP array keyed `0..n-1`.
    List(Shared<Vec<PhpValue>>),
}

/// Hashable identity of a scalar array key.
///
/// Text and bytes with the same content are the same key. Floats compare by
/// bit pattern. Composites have no identity and are looked up by scanning.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum KeyId {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(Box<[u8]>),
}

impl KeyId {
    fn of(key: &PhpValue) -> Option<Self> {
        match key {
            PhpValue::Null => Some(KeyId::Null),
            PhpValue::Bool(b) => Some(KeyId::Bool(*b)),
            PhpValue::Int(i) => Some(KeyId::Int(*i)),
            PhpValue::Float(f) => Some(KeyId::Float(f.to_bits())),
            PhpValue::String(_) | PhpValue::Bytes(_) => {
                key.as_bytes().map(|b| KeyId::Str(b.into()))
            }
            PhpValue::Array(_) | PhpValue::List(_) => None,
        }
    }
}

/// An insertion-ordered PHP array.
///
/// Keys are kept as given, so `Int(1)` and `String("1")` are different keys
/// here even though both are written as the key `"1"` by the encoder.
/// Scalar keys are indexed; lookup and insert by a scalar key are O(1).
#[derive(Debug, Clone, Default)]
pub struct PhpArray {
    entries: Vec<(PhpValue, PhpValue)>,
    /// Position in `entries` of every scalar key.
    index: HashMap<KeyId, usize>,
}

impl PartialEq for PhpArray {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl PhpArray {
    /// Create an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty array with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the array has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry.
    ///
    /// If the key is already present its value is replaced in place and the
    /// previous value returned; the entry keeps its original position.
    pub fn insert(&mut self, key: impl Into<PhpValue>, value: impl Into<PhpValue>) -> Option<PhpValue> {
        let key = key.into();
        let value = value.into();
        let existing = match KeyId::of(&key) {
            Some(id) => match self.index.entry(id) {
                Entry::Occupied(slot) => Some(*slot.get()),
                Entry::Vacant(slot) => {
                    slot.insert(self.entries.len());
                    None
                }
            },
            None => self.entries.iter().position(|(k, _)| *k == key),
        };
        match existing {
            Some(pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &PhpValue) -> Option<&PhpValue> {
        match KeyId::of(key) {
            Some(id) => self.index.get(&id).map(|&pos| &self.entries[pos].1),
            None => self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
        }
    }

    /// Look up a value by string key.
    pub fn get_str(&self, key: &str) -> Option<&PhpValue> {
        self.index
            .get(&KeyId::Str(key.as_bytes().into()))
            .map(|&pos| &self.entries[pos].1)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (PhpValue, PhpValue)> {
        self.entries.iter()
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &PhpValue> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterate over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &PhpValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Whether the keys are exactly the integers `0..n-1`, in that order.
    pub fn is_sequence(&self) -> bool {
        self.entries.iter().enumerate().all(|(pos, (key, _))| match key {
            PhpValue::Int(i) => usize::try_from(*i).ok() == Some(pos),
            _ => false,
        })
    }

    /// Convert to a sequence if the keys are exactly the integers `0..n-1`
    /// in insertion order.
    pub fn to_list(&self) -> Result<Vec<PhpValue>> {
        if !self.is_sequence() {
            return Err(Error::from(ErrorKind::NotASequence));
        }
        Ok(self.values().cloned().collect())
    }

    /// Consume the array, returning its entries.
    pub fn into_entries(self) -> Vec<(PhpValue, PhpValue)> {
        self.entries
    }
}

impl<K: Into<PhpValue>, V: Into<PhpValue>> FromIterator<(K, V)> for PhpArray {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut array = PhpArray::new();
        for (k, v) in iter {
            array.insert(k, v);
        }
        array
    }
}

impl IntoIterator for PhpArray {
    type Item = (PhpValue, PhpValue);
    type IntoIter = std::vec::IntoIter<(PhpValue, PhpValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a PhpArray {
    type Item = &'a (PhpValue, PhpValue);
    type IntoIter = std::slice::Iter<'a, (PhpValue, PhpValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl PhpValue {
    /// Build an ordered mapping from key-value pairs.
    ///
    /// Later duplicates overwrite earlier ones, keeping the first position.
    pub fn array<K, V, I>(entries: I) -> Self
    where
        K: Into<PhpValue>,
        V: Into<PhpValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        PhpValue::Array(Rc::new(RefCell::new(entries.into_iter().collect())))
    }

    /// Build an ordered sequence.
    pub fn list<T, I>(items: I) -> Self
    where
        T: Into<PhpValue>,
        I: IntoIterator<Item = T>,
    {
        PhpValue::List(Rc::new(RefCell::new(
            items.into_iter().map(Into::into).collect(),
        )))
    }

    /// Check if the value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, PhpValue::Null)
    }

    /// Check if the value is a boolean.
    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, PhpValue::Bool(_))
    }

    /// Check if the value is an integer.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, PhpValue::Int(_))
    }

    /// Check if the value is a float.
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, PhpValue::Float(_))
    }

    /// Check if the value is text or bytes.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, PhpValue::String(_) | PhpValue::Bytes(_))
    }

    /// Check if the value is an ordered mapping.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, PhpValue::Array(_))
    }

    /// Check if the value is a sequence.
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, PhpValue::List(_))
    }

    /// Get the value as a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PhpValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as an integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PhpValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PhpValue::Float(f) => Some(*f),
            PhpValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as text.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhpValue::String(s) => Some(s.as_str()),
            PhpValue::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Get the bytes a string value is written as.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PhpValue::String(s) => Some(s.as_bytes()),
            PhpValue::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Borrow the value as an ordered mapping.
    pub fn as_array(&self) -> Option<Ref<'_, PhpArray>> {
        match self {
            PhpValue::Array(a) => Some(a.borrow()),
            _ => None,
        }
    }

    /// Borrow the value as a sequence.
    pub fn as_list(&self) -> Option<Ref<'_, Vec<PhpValue>>> {
        match self {
            PhpValue::List(l) => Some(l.borrow()),
            _ => None,
        }
    }

    /// Get a type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PhpValue::Null => "null",
            PhpValue::Bool(_) => "boolean",
            PhpValue::Int(_) => "integer",
            PhpValue::Float(_) => "float",
            PhpValue::String(_) => "string",
            PhpValue::Bytes(_) => "bytes",
            PhpValue::Array(_) => "array",
            PhpValue::List(_) => "list",
        }
    }
}

impl From<bool> for PhpValue {
    fn from(b: bool) -> Self {
        PhpValue::Bool(b)
    }
}

impl From<i64> for PhpValue {
    fn from(i: i64) -> Self {
        PhpValue::Int(i)
    }
}

impl From<i32> for PhpValue {
    fn from(i: i32) -> Self {
        PhpValue::Int(i64::from(i))
    }
}

impl From<f64> for PhpValue {
    fn from(f: f64) -> Self {
        PhpValue::Float(f)
    }
}

impl From<&str> for PhpValue {
    fn from(s: &str) -> Self {
        PhpValue::String(s.to_owned())
    }
}

impl From<String> for PhpValue {
    fn from(s: String) -> Self {
        PhpValue::String(s)
    }
}

impl From<&[u8]> for PhpValue {
    fn from(b: &[u8]) -> Self {
        PhpValue::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for PhpValue {
    fn from(b: Vec<u8>) -> Self {
        PhpValue::Bytes(b)
    }
}

impl<T: Into<PhpValue>> From<Option<T>> for PhpValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PhpValue::Null, Into::into)
    }
}

impl From<PhpArray> for PhpValue {
    fn from(array: PhpArray) -> Self {
        PhpValue::Array(Rc::new(RefCell::new(array)))
    }
}

impl From<Vec<PhpValue>> for PhpValue {
    fn from(items: Vec<PhpValue>) -> Self {
        PhpValue::List(Rc::new(RefCell::new(items)))
    }
}

impl fmt::Display for PhpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpValue::Null => write!(f, "null"),
            PhpValue::Bool(b) => write!(f, "{}", b),
            PhpValue::Int(i) => write!(f, "{}", i),
            PhpValue::Float(fl) => write!(f, "{}", fl),
            PhpValue::String(s) => write!(f, "\"{}\"", s),
            PhpValue::Bytes(b) => write!(f, "b\"{}\"", BStr::new(b)),
            PhpValue::Array(arr) => {
                write!(f, "[")?;
                for (i, (k, v)) in arr.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "]")
            }
            PhpValue::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}
