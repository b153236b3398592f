//! Raw cell values returned by the backing store
//!
//! The `Value` enum represents every cell a feature query can produce before
//! normalization: scalars, nominal strings, and the per-interval arrays of
//! series features.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value (SQL NULL or absent column)
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (f64 for simplicity, handles both int and float)
    Number(f64),
    /// String value
    String(String),
    /// Array of values (aggregated series)
    Array(Vec<Value>),
}

impl Value {
    /// Check whether this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the array payload, if any
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric view of this value.
    ///
    /// Booleans map to 0/1 and numeric strings are parsed; `Ok(None)` means the
    /// cell is missing, which includes NaN and infinities. Non-numeric strings
    /// and arrays are type errors.
    pub fn to_f64(&self) -> crate::error::Result<Option<f64>> {
        match self {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
            Value::Number(n) => Ok(finite(*n)),
            Value::String(s) => s.trim().parse::<f64>().map(finite).map_err(|_| {
                crate::error::CoreError::TypeError(format!("'{}' is not numeric", s))
            }),
            Value::Array(_) => Err(crate::error::CoreError::TypeError(
                "array cannot be used as a scalar".to_string(),
            )),
        }
    }
}

fn finite(n: f64) -> Option<f64> {
    n.is_finite().then_some(n)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}
