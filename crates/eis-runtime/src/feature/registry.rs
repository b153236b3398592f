//! Feature Registry Module
//!
//! Name-to-descriptor lookup over the closed officer catalog.

use crate::error::{Result, RuntimeError};
use crate::feature::catalog::FeatureName;
use crate::feature::definition::{EvalParams, FeatureDescriptor, OutputColumn};
use crate::feature::tables::TableConfig;
use eis_core::TargetUnit;
use std::sync::Arc;
use tracing::debug;

/// Builds feature descriptors for a fixed table layout
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    tables: Arc<TableConfig>,
}

impl FeatureRegistry {
    /// Create a registry over the given table layout
    pub fn new(tables: TableConfig) -> Self {
        Self {
            tables: Arc::new(tables),
        }
    }

    pub fn tables(&self) -> &TableConfig {
        &self.tables
    }

    /// Construct a fresh descriptor for `name` evaluated under `params`.
    ///
    /// No query is issued; the SQL is rendered when the descriptor is asked
    /// for it.
    pub fn lookup(&self, name: &str, params: &EvalParams) -> Result<FeatureDescriptor> {
        let feature: FeatureName = name
            .parse()
            .map_err(|_| RuntimeError::UnknownFeature(name.to_string()))?;

        if params.unit != TargetUnit::Officer {
            return Err(RuntimeError::UnsupportedUnit {
                feature: name.to_string(),
                unit: params.unit,
            });
        }

        if let Some(days) = params.lookback_days {
            if days <= 0 {
                return Err(RuntimeError::Config(format!(
                    "lookback must be a positive number of days, got {}",
                    days
                )));
            }
        }

        let entry = feature.entry();
        let columns = entry
            .columns
            .into_iter()
            .map(|(source, name)| OutputColumn::new(source, name))
            .collect();

        let descriptor = FeatureDescriptor::new(
            feature.as_str(),
            entry.kind,
            entry.scope,
            columns,
            params,
            Arc::clone(&self.tables),
            entry.builder,
        )
        .with_description(entry.description)
        .with_imputation(entry.imputation);

        debug!(
            "Resolved feature {} ({}, {}) as of {}",
            descriptor.name(),
            descriptor.kind(),
            descriptor.scope(),
            params.reference_date
        );

        Ok(descriptor)
    }

    /// Check whether a feature name is known
    pub fn contains(&self, name: &str) -> bool {
        name.parse::<FeatureName>().is_ok()
    }

    /// All known feature names
    pub fn feature_names(&self) -> Vec<&'static str> {
        FeatureName::ALL.iter().map(|f| f.as_str()).collect()
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}
