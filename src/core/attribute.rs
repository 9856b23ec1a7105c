//! Structured attributes attached to log records
//!
//! This module provides:
//! - `Value`: typed payload of an attribute, including nested groups
//! - `Attribute`: a key/value pair
//! - `args_to_attrs`: pairwise conversion of a variadic argument list

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// Key used for arguments that could not be paired with a key
pub const BAD_KEY: &str = "!BADKEY";

/// Value type for structured attributes
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Null,
    /// Rendered error message
    Error(String),
    /// `{:?}` rendering of an arbitrary value
    Debug(String),
    /// Nested ordered attributes
    Group(Vec<Attribute>),
}

impl Value {
    pub fn error(err: &dyn std::error::Error) -> Self {
        Value::Error(err.to_string())
    }

    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Value::Debug(format!("{:?}", value))
    }

    pub fn group<I>(attrs: I) -> Self
    where
        I: IntoIterator<Item = Attribute>,
    {
        Value::Group(attrs.into_iter().collect())
    }

    /// Convert to serde_json::Value for JSON output
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Value::String(s) | Value::Error(s) | Value::Debug(s) => {
                serde_json::Value::String(s.clone())
            }
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Uint(u) => serde_json::Value::Number((*u).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Null => serde_json::Value::Null,
            Value::Group(attrs) => serde_json::Value::Object(
                attrs
                    .iter()
                    .map(|a| (a.key.clone(), a.value.to_json_value()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Error(e) => write!(f, "error {:?}", e),
            Value::Debug(d) => write!(f, "{}", d),
            Value::Group(attrs) => {
                write!(f, "{{")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", attr.key, attr.value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) | Value::Error(s) | Value::Debug(s) => serializer.serialize_str(s),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Uint(u) => serializer.serialize_u64(*u),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Null => serializer.serialize_unit(),
            Value::Group(attrs) => AttributeMap(attrs).serialize(serializer),
        }
    }
}

/// Serializes a slice of attributes as an ordered JSON object
pub struct AttributeMap<'a>(pub &'a [Attribute]);

impl Serialize for AttributeMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attr in self.0 {
            map.serialize_entry(&attr.key, &attr.value)?;
        }
        map.end()
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )+
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64, isize);
impl_from_int!(Uint, u64, u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Attribute>> for Value {
    fn from(attrs: Vec<Attribute>) -> Self {
        Value::Group(attrs)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A single key/value pair on a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub key: String,
    pub value: Value,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether the attribute came from an unpaired argument
    pub fn is_bad_key(&self) -> bool {
        self.key == BAD_KEY
    }
}

/// Convert a variadic argument list into attributes
///
/// A string argument is a key and takes the next argument as its value.
/// A trailing key with no value, or any non-string argument in key
/// position, becomes a [`BAD_KEY`] attribute holding that argument.
pub fn args_to_attrs<I>(args: I) -> Vec<Attribute>
where
    I: IntoIterator<Item = Value>,
{
    let mut args = args.into_iter();
    let mut attrs = Vec::new();

    while let Some(arg) = args.next() {
        let attr = match arg {
            Value::String(key) => match args.next() {
                Some(value) => Attribute { key, value },
                None => Attribute::new(BAD_KEY, Value::String(key)),
            },
            other => Attribute::new(BAD_KEY, other),
        };
        attrs.push(attr);
    }

    attrs
}
