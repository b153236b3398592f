//! Working table of the assembly pipeline
//!
//! Starts as the label frame and grows by one block of columns per joined
//! feature. Values stay optional until the completeness filter runs.

use crate::error::{Result, RuntimeError};
use crate::labels::LabelFrame;
use chrono::NaiveDate;
use eis_core::{EntityId, ImputationPolicy, NormalizedFeatureFrame};

/// One labeled entity with its joined feature values
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub entity: EntityId,
    pub outcome: f64,
    pub occurred_on: Option<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

impl JoinedRow {
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }
}

/// Label rows left-joined with feature columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedTable {
    columns: Vec<String>,
    policies: Vec<ImputationPolicy>,
    pub(crate) rows: Vec<JoinedRow>,
}

impl JoinedTable {
    /// Start from the label frame, without feature columns
    pub fn from_labels(labels: &LabelFrame) -> Self {
        let rows = labels
            .rows()
            .iter()
            .map(|label| JoinedRow {
                entity: label.entity.clone(),
                outcome: label.outcome,
                occurred_on: label.occurred_on,
                values: Vec::new(),
            })
            .collect();
        Self {
            columns: Vec::new(),
            policies: Vec::new(),
            rows,
        }
    }

    /// Left join `frame` by entity id.
    ///
    /// Every label row is kept; entities the frame does not cover get missing
    /// values for all of its columns. Returns how many rows matched.
    ///
    /// Fails without touching the table when a column of `frame` is already
    /// present.
    pub fn left_join(
        &mut self,
        frame: &NormalizedFeatureFrame,
        policy: ImputationPolicy,
    ) -> Result<usize> {
        for (i, column) in frame.columns().iter().enumerate() {
            if self.columns.contains(column) || frame.columns()[..i].contains(column) {
                return Err(RuntimeError::DuplicateColumn(column.clone()));
            }
        }

        let width = frame.columns().len();
        let mut matched = 0;
        for row in &mut self.rows {
            match frame.get(&row.entity) {
                Some(values) => {
                    matched += 1;
                    row.values.extend_from_slice(values);
                }
                None => row.values.extend(std::iter::repeat(None).take(width)),
            }
        }
        self.columns.extend(frame.columns().iter().cloned());
        self.policies.extend(std::iter::repeat(policy).take(width));
        Ok(matched)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Declared imputation policy of each column
    pub fn policies(&self) -> &[ImputationPolicy] {
        &self.policies
    }

    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [JoinedRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Mean of the present values of column `idx`
    pub fn column_mean(&self, idx: usize) -> Option<f64> {
        let present: Vec<f64> = self.rows.iter().filter_map(|r| r.values[idx]).collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        }
    }

    /// Number of missing cells
    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.values.iter().filter(|v| v.is_none()).count())
            .sum()
    }

    /// Remove every row with a missing value; returns how many were removed
    pub fn drop_incomplete(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(JoinedRow::is_complete);
        before - self.rows.len()
    }
}
