//! Per-entity feature frames
//!
//! A `RawFeatureFrame` is what a feature query returns: possibly duplicated
//! entity ids and untyped cells. A `NormalizedFeatureFrame` holds at most one
//! numeric row per entity, indexed by id, in first-seen order.

use crate::error::{CoreError, Result};
use crate::types::entity::EntityId;
use crate::types::value::Value;
use std::collections::HashMap;

/// One raw result row
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub entity: EntityId,
    pub values: Vec<Value>,
}

/// Unprocessed result of evaluating a feature query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeatureFrame {
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawFeatureFrame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; the value count must match the column count
    pub fn push(&mut self, entity: EntityId, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(CoreError::ColumnMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.rows.push(RawRow { entity, values });
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Deduplicated numeric frame indexed by entity id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedFeatureFrame {
    columns: Vec<String>,
    ids: Vec<EntityId>,
    index: HashMap<EntityId, usize>,
    values: Vec<Vec<Option<f64>>>,
}

impl NormalizedFeatureFrame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            ids: Vec::new(),
            index: HashMap::new(),
            values: Vec::new(),
        }
    }

    /// Insert a row for `entity`.
    ///
    /// Returns `Ok(false)` and leaves the frame untouched when the entity is
    /// already present: the first occurrence wins.
    pub fn insert(&mut self, entity: EntityId, row: Vec<Option<f64>>) -> Result<bool> {
        if row.len() != self.columns.len() {
            return Err(CoreError::ColumnMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        if self.index.contains_key(&entity) {
            return Ok(false);
        }
        self.index.insert(entity.clone(), self.ids.len());
        self.ids.push(entity);
        self.values.push(row);
        Ok(true)
    }

    pub fn get(&self, entity: &EntityId) -> Option<&[Option<f64>]> {
        self.index.get(entity).map(|&i| self.values[i].as_slice())
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        self.index.contains_key(entity)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn entity_ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate rows in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &[Option<f64>])> {
        self.ids
            .iter()
            .zip(self.values.iter())
            .map(|(id, row)| (id, row.as_slice()))
    }

    /// Values of one column in insertion order
    pub fn column_values(&self, column: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.columns.iter().position(|c| c == column)?;
        Some(self.values.iter().map(|row| row[idx]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_frame_rejects_ragged_rows() {
        let mut frame = RawFeatureFrame::new(vec!["a".to_string(), "b".to_string()]);
        assert!(frame.push("1".into(), vec![Value::Number(1.0)]).is_err());
        assert!(frame
            .push("1".into(), vec![Value::Number(1.0), Value::Null])
            .is_ok());
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.column_index("b"), Some(1));
    }

    #[test]
    fn test_normalized_frame_keeps_first_occurrence() {
        let mut frame = NormalizedFeatureFrame::new(vec!["x".to_string()]);
        assert!(frame.insert("E1".into(), vec![Some(1.0)]).unwrap());
        assert!(frame.insert("E2".into(), vec![None]).unwrap());
        assert!(!frame.insert("E1".into(), vec![Some(9.0)]).unwrap());

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(&"E1".into()), Some(&[Some(1.0)][..]));
        assert_eq!(frame.column_values("x"), Some(vec![Some(1.0), None]));

        let order: Vec<&str> = frame.entity_ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(order, vec!["E1", "E2"]);
    }
}
