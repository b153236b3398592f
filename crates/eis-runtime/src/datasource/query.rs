//! Tabular query results

use eis_core::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static NULL: Value = Value::Null;

/// Result of one read-only query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in select order
    pub columns: Vec<String>,

    /// Result rows keyed by column name
    pub rows: Vec<HashMap<String, Value>>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,

    /// Data source that provided the result
    pub source: String,
}

impl QueryResult {
    /// Build a result from positional rows
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect();
        Self {
            columns,
            rows,
            execution_time_ms: 0,
            source: String::new(),
        }
    }

    /// An empty result with the given columns
    pub fn empty(columns: &[&str]) -> Self {
        Self::from_rows(columns, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell lookup; absent columns read as null
    pub fn get(&self, row: usize, column: &str) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }
}
