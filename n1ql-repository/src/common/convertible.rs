use crate::common::Value;
use crate::errors::{ErrorKind, N1qlError, N1qlResult};

/// Conversion between a Rust type and its [Value] representation.
///
/// Entities returned by a query are decoded from row values through this trait, and
/// typed bind values can be produced with [Convertible::to_value].
pub trait Convertible {
    type Output;

    fn to_value(&self) -> N1qlResult<Value>;
    fn from_value(value: &Value) -> N1qlResult<Self::Output>;
}

fn mapping_error(value: &Value, expected: &str) -> N1qlError {
    log::error!("Value {} is not {}", value, expected);
    N1qlError::new(
        &format!("Value is not {}", expected),
        ErrorKind::ObjectMappingError,
    )
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> N1qlResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> N1qlResult<Self::Output> {
        Ok(value.clone())
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> N1qlResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> N1qlResult<Self> {
        value.as_bool().ok_or_else(|| mapping_error(value, "a bool"))
    }
}

impl Convertible for i32 {
    type Output = i32;

    fn to_value(&self) -> N1qlResult<Value> {
        Ok(Value::I64(*self as i64))
    }

    fn from_value(value: &Value) -> N1qlResult<Self> {
        match value.as_i64() {
            Some(i) => i32::try_from(i).map_err(|_| mapping_error(value, "an i32")),
            None => Err(mapping_error(value, "an i32")),
        }
    }
}

impl Convertible for i64 {
    type Output = i64;

    fn to_value(&self) -> N1qlResult<Value> {
        Ok(Value::I64(*self))
    }

    fn from_value(value: &Value) -> N1qlResult<Self> {
        value.as_i64().ok_or_else(|| mapping_error(value, "an i64"))
    }
}

impl Convertible for u32 {
    type Output = u32;

    fn to_value(&self) -> N1qlResult<Value> {
        Ok(Value::I64(*self as i64))
    }

    fn from_value(value: &Value) -> N1qlResult<Self> {
        match value.as_i64() {
            Some(i) => u32::try_from(i).map_err(|_| mapping_error(value, "a u32")),
            None => Err(mapping_error(value, "a u32")),
        }
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> N1qlResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> N1qlResult<Self> {
        value.as_f64().ok_or_else(|| mapping_error(value, "an f64"))
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> N1qlResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> N1qlResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mapping_error(value, "a string"))
    }
}

impl<T: Convertible<Output = T>> Convertible for Option<T> {
    type Output = Option<T>;

    fn to_value(&self) -> N1qlResult<Value> {
        match self {
            Some(inner) => inner.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> N1qlResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Convertible<Output = T>> Convertible for Vec<T> {
    type Output = Vec<T>;

    fn to_value(&self) -> N1qlResult<Value> {
        let items = self
            .iter()
            .map(|item| item.to_value())
            .collect::<N1qlResult<Vec<_>>>()?;
        Ok(Value::Array(items))
    }

    fn from_value(value: &Value) -> N1qlResult<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            other => Err(mapping_error(other, "an array")),
        }
    }
}

/// Reads a field of an object row and converts it, failing with
/// [ErrorKind::ObjectMappingError] when the row is not an object.
///
/// A missing field is handed to `T` as [Value::Null], so `Option` fields decode to
/// `None`.
pub fn field_value<T: Convertible<Output = T>>(row: &Value, field: &str) -> N1qlResult<T> {
    match row {
        Value::Object(map) => T::from_value(map.get(field).unwrap_or(&Value::Null)),
        other => Err(mapping_error(other, "an object")),
    }
}
