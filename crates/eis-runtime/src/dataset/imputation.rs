//! Imputation strategies
//!
//! Run after the join and before the completeness filter. Whatever is still
//! missing afterwards is dropped.

use crate::dataset::table::JoinedTable;
use eis_core::ImputationPolicy;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fills missing values in the joined table
pub trait ImputationStrategy: Send + Sync {
    fn impute(&self, table: &mut JoinedTable);

    fn name(&self) -> &str;
}

/// Leave missing values alone, so incomplete rows get dropped
#[derive(Debug, Clone, Copy, Default)]
pub struct DropIncomplete;

impl ImputationStrategy for DropIncomplete {
    fn impute(&self, _table: &mut JoinedTable) {}

    fn name(&self) -> &str {
        "drop_incomplete"
    }
}

/// Apply each feature's declared policy: `mean` fills with the column mean
/// over present values, `zero` fills with 0 and `none` leaves the gap.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredPolicy;

impl ImputationStrategy for DeclaredPolicy {
    fn impute(&self, table: &mut JoinedTable) {
        let fills: Vec<Option<f64>> = table
            .policies()
            .iter()
            .enumerate()
            .map(|(idx, policy)| match policy {
                ImputationPolicy::Mean => table.column_mean(idx),
                ImputationPolicy::Zero => Some(0.0),
                ImputationPolicy::None => None,
            })
            .collect();

        let mut filled = 0;
        for row in table.rows_mut() {
            for (value, fill) in row.values.iter_mut().zip(&fills) {
                if value.is_none() && fill.is_some() {
                    *value = *fill;
                    filled += 1;
                }
            }
        }
        debug!("Imputed {} missing values", filled);
    }

    fn name(&self) -> &str {
        "declared"
    }
}

/// Configured imputation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationMode {
    #[default]
    DropIncomplete,
    Declared,
}

impl ImputationMode {
    pub fn strategy(self) -> Box<dyn ImputationStrategy> {
        match self {
            ImputationMode::DropIncomplete => Box::new(DropIncomplete),
            ImputationMode::Declared => Box::new(DeclaredPolicy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{LabelFrame, LabelRow};
    use eis_core::NormalizedFeatureFrame;

    fn table() -> JoinedTable {
        let labels = LabelFrame::from_rows(["E1", "E2", "E3"].iter().map(|id| LabelRow {
            entity: (*id).into(),
            outcome: 0.0,
            occurred_on: None,
        }));
        let mut table = JoinedTable::from_labels(&labels);

        let mut age = NormalizedFeatureFrame::new(vec!["age".to_string()]);
        age.insert("E1".into(), vec![Some(30.0)]).unwrap();
        age.insert("E2".into(), vec![Some(40.0)]).unwrap();
        table.left_join(&age, ImputationPolicy::Mean).unwrap();

        let mut arrests = NormalizedFeatureFrame::new(vec!["arrests".to_string()]);
        arrests.insert("E2".into(), vec![Some(3.0)]).unwrap();
        table.left_join(&arrests, ImputationPolicy::Zero).unwrap();

        let mut beat = NormalizedFeatureFrame::new(vec!["is_north".to_string()]);
        beat.insert("E1".into(), vec![Some(1.0)]).unwrap();
        table.left_join(&beat, ImputationPolicy::None).unwrap();
        table
    }

    #[test]
    fn test_drop_incomplete_is_noop() {
        let mut t = table();
        DropIncomplete.impute(&mut t);
        assert_eq!(t.missing_count(), 5);
    }

    #[test]
    fn test_declared_policy_fills_mean_and_zero() {
        let mut t = table();
        DeclaredPolicy.impute(&mut t);

        assert_eq!(t.rows()[2].values, vec![Some(35.0), Some(0.0), None]);
        assert_eq!(t.rows()[0].values, vec![Some(30.0), Some(0.0), Some(1.0)]);
        assert_eq!(t.missing_count(), 2);
    }
}
