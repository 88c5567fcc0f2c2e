use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::N1qlResult;

/// A JSON-like value as exchanged with the query service.
///
/// Bind values sent with a parameterized or prepared query are `Value`s, and so are the
/// rows handed back by a [crate::repository::N1qlOperations] implementation before they
/// are decoded into entities.
///
/// # Variants
/// - `Null`: absence of a value
/// - `Bool`: `true` / `false`
/// - `I64`: any integer that fits in 64 bits
/// - `F64`: floating point number
/// - `String`: text
/// - `Array`: ordered list of values
/// - `Object`: string-keyed map, rendered with sorted keys
///
/// # Usage
/// ```text
/// let v: Value = 42.into();
/// let row = doc! { "name": "Alice", "age": 42 };
/// assert_eq!(row.get("name").and_then(|v| v.as_str()), Some("Alice"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as `f64`, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            Value::I64(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` when this value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Inserts `key` into an object value. Any other variant is first replaced by an
    /// empty object.
    pub fn put<V: Into<Value>>(&mut self, key: &str, value: V) {
        if !matches!(self, Value::Object(_)) {
            *self = Value::Object(BTreeMap::new());
        }
        if let Value::Object(map) = self {
            map.insert(key.to_string(), value.into());
        }
    }

    /// Renders this value as compact JSON text.
    ///
    /// Floats keep their fraction (`1.0` stays `1.0`) and non-finite floats render as
    /// `null`.
    pub fn to_json(&self) -> N1qlResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses JSON text, such as a row returned by the query service.
    pub fn from_json(json: &str) -> N1qlResult<Value> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Array(items) => write!(f, "[{}]", items.iter().join(", ")),
            other => write!(f, "{}", other.to_json().map_err(|_| std::fmt::Error)?),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::I64(value as i64)
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F64(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Object(value)
    }
}

/// Builds a [Value::Object] from `"key": value` pairs.
///
/// ```rust,ignore
/// let row = doc! { "name": "Alice", "age": 42 };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::common::Value::Object(std::collections::BTreeMap::new())
    };
    ($($key:literal : $value:expr),+ $(,)?) => {{
        let mut map = std::collections::BTreeMap::new();
        $(
            map.insert($key.to_string(), $crate::common::Value::from($value));
        )+
        $crate::common::Value::Object(map)
    }};
}
