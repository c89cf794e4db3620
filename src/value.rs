use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::metadata::DataType;

/// A single present value moved across the wire.
///
/// Absence is never a variant: nulls are carried out-of-band by a presence
/// bitmask and surface as `Option<Value>` in decoded rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value<'a> {
    Boolean(bool),
    /// 32-bit signed integer.
    Integer(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 32-bit IEEE-754 float.
    Float(f32),
    /// 64-bit IEEE-754 float.
    Double(f64),
    /// UTF-8 text, borrowed from the response buffer when possible.
    Binary(Cow<'a, str>),
}

/// One decoded row or column: `None` marks an absent cell.
pub type Row<'a> = Vec<Option<Value<'a>>>;

impl Value<'_> {
    /// The wire type this value encodes as.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Value::Boolean(_) => DataType::Boolean,
            Value::Integer(_) => DataType::Integer,
            Value::Long(_) => DataType::Long,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Binary(_) => DataType::Binary,
        }
    }

    #[must_use]
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Boolean(v) => Value::Boolean(v),
            Value::Integer(v) => Value::Integer(v),
            Value::Long(v) => Value::Long(v),
            Value::Float(v) => Value::Float(v),
            Value::Double(v) => Value::Double(v),
            Value::Binary(s) => Value::Binary(Cow::Owned(s.into_owned())),
        }
    }

    /// Compares floats by bit pattern so `NaN` payloads round-trip as equal.
    #[must_use]
    pub fn bit_eq(&self, other: &Value<'_>) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (a, b) => a == b,
        }
    }
}

impl From<bool> for Value<'static> {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value<'static> {
    fn from(value: i32) -> Self {
        Value::Integer(value)
    }
}

impl From<i64> for Value<'static> {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f32> for Value<'static> {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value<'static> {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<String> for Value<'static> {
    fn from(value: String) -> Self {
        Value::Binary(Cow::Owned(value))
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::Binary(Cow::Borrowed(value))
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Binary(s) => f.write_str(s),
        }
    }
}
