//! Entity identifiers

use crate::error::{CoreError, Result};
use crate::types::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier of an officer or dispatch event.
///
/// Ids arrive from the store as integers or strings; both are normalized to
/// their canonical text form so that `17`, `17.0` and `"17"` join together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build an id from a raw cell. Null and composite values are rejected.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Ok(Self(s.trim().to_string())),
            Value::Number(n) if n.is_finite() => Ok(Self(Value::Number(*n).to_string())),
            other => Err(CoreError::InvalidValue(format!(
                "cannot use {} as an entity id",
                other
            ))),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_text_ids_agree() {
        let from_int = EntityId::from_value(&Value::Number(17.0)).unwrap();
        let from_text = EntityId::from_value(&Value::from("17")).unwrap();
        assert_eq!(from_int, from_text);
    }

    #[test]
    fn test_null_id_rejected() {
        assert!(EntityId::from_value(&Value::Null).is_err());
        assert!(EntityId::from_value(&Value::from("  ")).is_err());
    }
}
