//! Categorical expansion
//!
//! Turns a single nominal column into 0/1 indicator columns.

use crate::error::{Result, RuntimeError};
use eis_core::{NormalizedFeatureFrame, RawFeatureFrame, Value};
use tracing::{debug, warn};

/// Expands nominal columns into indicator columns.
///
/// Categories are the distinct non-null, non-blank values in order of first
/// appearance, lowercased and deduplicated after lowercasing (so `"Male"` and
/// `"MALE"` are the same category). Exactly two categories collapse into a
/// single `is_<first>` column. Otherwise each string category gets its own
/// `is_<category>` column and non-string categories get none. Fewer than two
/// categories produce no columns at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalExpander;

impl CategoricalExpander {
    pub fn new() -> Self {
        Self
    }

    /// Expand the single value column of `raw`.
    ///
    /// Returns the indicator frame, indexed by entity id (first row wins), and
    /// the generated column names in order.
    pub fn expand(&self, raw: &RawFeatureFrame) -> Result<(NormalizedFeatureFrame, Vec<String>)> {
        if raw.columns().len() != 1 {
            return Err(RuntimeError::TypeError(format!(
                "categorical expansion needs exactly one value column, got {}",
                raw.columns().len()
            )));
        }
        let column = &raw.columns()[0];

        let mut categories: Vec<Value> = Vec::new();
        for row in raw.rows() {
            if let Some(category) = normalize(&row.values[0]) {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
        }

        let indicators: Vec<(String, Value)> = match categories.len() {
            0 | 1 => {
                warn!(
                    "Column '{}' has {} usable categor{}; no indicator columns generated",
                    column,
                    categories.len(),
                    if categories.len() == 1 { "y" } else { "ies" }
                );
                Vec::new()
            }
            2 => vec![(indicator_name(&categories[0]), categories[0].clone())],
            _ => categories
                .into_iter()
                .filter(|c| matches!(c, Value::String(_)))
                .map(|c| (indicator_name(&c), c))
                .collect(),
        };

        let names: Vec<String> = indicators.iter().map(|(name, _)| name.clone()).collect();
        let mut frame = NormalizedFeatureFrame::new(names.clone());

        for row in raw.rows() {
            let value = normalize(&row.values[0]);
            let flags = indicators
                .iter()
                .map(|(_, category)| {
                    let hit = value.as_ref() == Some(category);
                    Some(if hit { 1.0 } else { 0.0 })
                })
                .collect();
            frame.insert(row.entity.clone(), flags)?;
        }

        debug!("Expanded '{}' into {:?}", column, names);
        Ok((frame, names))
    }
}

/// Normalized category of a cell; `None` for missing and blank values
fn normalize(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(Value::String(s.to_lowercase())),
        Value::Number(n) if n.is_nan() => None,
        other => Some(other.clone()),
    }
}

fn indicator_name(category: &Value) -> String {
    format!("is_{}", category)
}
