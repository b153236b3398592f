//! Feature classification enums

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind of a feature, which decides its post-processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// One or more pre-named numeric columns, used directly
    Scalar,
    /// A single nominal column, expanded into indicator columns
    Categorical,
    /// A fixed-length per-interval count sequence, flattened into slots
    Series,
}

/// Declared imputation policy of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImputationPolicy {
    /// Fill with the column mean
    Mean,
    /// Fill with zero (count features: absence means no events)
    Zero,
    /// Leave missing
    #[default]
    None,
}

/// Unit of analysis a dataset is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetUnit {
    #[default]
    Officer,
    Dispatch,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Scalar => write!(f, "scalar"),
            FeatureKind::Categorical => write!(f, "categorical"),
            FeatureKind::Series => write!(f, "series"),
        }
    }
}

impl fmt::Display for ImputationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputationPolicy::Mean => write!(f, "mean"),
            ImputationPolicy::Zero => write!(f, "zero"),
            ImputationPolicy::None => write!(f, "none"),
        }
    }
}

impl fmt::Display for TargetUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetUnit::Officer => write!(f, "officer"),
            TargetUnit::Dispatch => write!(f, "dispatch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        let kind: FeatureKind = serde_json::from_str("\"categorical\"").unwrap();
        assert_eq!(kind, FeatureKind::Categorical);

        let unit: TargetUnit = serde_json::from_str("\"dispatch\"").unwrap();
        assert_eq!(unit, TargetUnit::Dispatch);
        assert_eq!(TargetUnit::default(), TargetUnit::Officer);
    }
}
