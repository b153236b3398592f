//! Dataset assembly
//!
//! labels -> left join every enabled feature -> reorder -> impute ->
//! drop incomplete rows -> split into matrix, labels, ids and names.

use crate::dataset::imputation::{DropIncomplete, ImputationStrategy};
use crate::dataset::shuffle::{RowOrder, SeededShuffle};
use crate::dataset::table::JoinedTable;
use crate::dataset::toggles::FeatureToggles;
use crate::datasource::BackingStore;
use crate::error::{Result, RuntimeError};
use crate::feature::{FeatureLoader, FeatureRegistry, TableConfig};
use crate::labels::{LabelLoader, LabelWindow};
use chrono::NaiveDate;
use eis_core::{EntityId, NormalizedFeatureFrame, TargetUnit};
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dense feature matrix, one row per entity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }
}

/// Assembled training data.
///
/// `features.rows`, `labels`, `entity_ids` and `occurred_on` are row-aligned;
/// `feature_names` enumerates the matrix columns in join order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub features: FeatureMatrix,
    pub labels: Vec<f64>,
    pub entity_ids: Vec<EntityId>,
    pub feature_names: Vec<String>,
    pub occurred_on: Vec<Option<NaiveDate>>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn from_complete_table(table: JoinedTable, feature_names: Vec<String>) -> Self {
        let columns = table.columns().to_vec();
        let mut dataset = Dataset {
            feature_names,
            ..Default::default()
        };
        for row in table.rows {
            dataset.entity_ids.push(row.entity);
            dataset.labels.push(row.outcome);
            dataset.occurred_on.push(row.occurred_on);
            dataset
                .features
                .rows
                .push(row.values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect());
        }
        dataset.features.columns = columns;
        dataset
    }
}

/// Builds datasets from labels and toggled features
pub struct DatasetAssembler {
    labels: LabelLoader,
    features: FeatureLoader,
    unit: TargetUnit,
    row_order: Box<dyn RowOrder>,
    imputation: Box<dyn ImputationStrategy>,
    parallel_loads: bool,
}

impl DatasetAssembler {
    /// Create an assembler over `store`.
    ///
    /// Defaults: officer unit, entropy-seeded shuffle, drop-incomplete
    /// imputation, sequential feature loads.
    pub fn new(store: Arc<dyn BackingStore>, tables: TableConfig) -> Self {
        Self {
            labels: LabelLoader::new(Arc::clone(&store), tables.clone()),
            features: FeatureLoader::new(store, FeatureRegistry::new(tables)),
            unit: TargetUnit::Officer,
            row_order: Box::new(SeededShuffle::default()),
            imputation: Box::new(DropIncomplete),
            parallel_loads: false,
        }
    }

    pub fn with_unit(mut self, unit: TargetUnit) -> Self {
        self.unit = unit;
        self.features = self.features.with_unit(unit);
        self
    }

    pub fn with_lookback(mut self, days: Option<i64>) -> Self {
        self.features = self.features.with_lookback(days);
        self
    }

    pub fn with_row_order(mut self, row_order: Box<dyn RowOrder>) -> Self {
        self.row_order = row_order;
        self
    }

    pub fn with_imputation(mut self, imputation: Box<dyn ImputationStrategy>) -> Self {
        self.imputation = imputation;
        self
    }

    /// Issue feature queries concurrently; join order is unaffected
    pub fn with_parallel_loads(mut self, parallel: bool) -> Self {
        self.parallel_loads = parallel;
        self
    }

    pub fn feature_loader(&self) -> &FeatureLoader {
        &self.features
    }

    pub fn label_loader(&self) -> &LabelLoader {
        &self.labels
    }

    /// Assemble the dataset for labels in `window`, features as of
    /// `reference_date`.
    ///
    /// Fails when no feature is enabled, when the window holds no labels,
    /// when the joined features yield no columns, and when no row survives the
    /// completeness filter. Two features producing the same column name fail
    /// with [`RuntimeError::DuplicateColumn`].
    pub async fn assemble(
        &self,
        toggles: &FeatureToggles,
        window: &LabelWindow,
        reference_date: NaiveDate,
    ) -> Result<Dataset> {
        let selected = toggles.enabled();
        if selected.is_empty() {
            return Err(RuntimeError::EmptyResult(format!(
                "no features enabled (window {}, as of {})",
                window, reference_date
            )));
        }

        // Resolve everything up front so a bad name fails before any query
        let descriptors = selected
            .iter()
            .map(|name| self.features.describe(name, reference_date))
            .collect::<Result<Vec<_>>>()?;

        let labels = self.labels.load(window, self.unit).await?;
        if labels.is_empty() {
            return Err(RuntimeError::EmptyResult(format!(
                "no labels in window {}",
                window
            )));
        }

        info!(
            "Assembling {} features for {} labeled entities as of {}",
            selected.len(),
            labels.len(),
            reference_date
        );
        let loaded = self.load_features(&selected, reference_date).await?;

        let mut table = JoinedTable::from_labels(&labels);
        let mut feature_names = Vec::new();
        for (descriptor, (frame, names)) in descriptors.iter().zip(loaded) {
            let matched = table.left_join(&frame, descriptor.imputation_policy())?;
            if names.is_empty() {
                // A feature without columns leaves no missing cell to drop
                if matched == 0 {
                    return Err(RuntimeError::EmptyResult(format!(
                        "feature {} has no rows for any labeled entity (window {}, as of {})",
                        descriptor.name(),
                        window,
                        reference_date
                    )));
                }
                warn!(
                    "Feature {} is degenerate and adds no columns",
                    descriptor.name()
                );
            } else if matched == 0 {
                warn!(
                    "Feature {} matched none of the {} labeled entities",
                    descriptor.name(),
                    table.len()
                );
            } else {
                debug!(
                    "Joined {}: {}/{} rows matched",
                    descriptor.name(),
                    matched,
                    table.len()
                );
            }
            feature_names.extend(names);
        }

        if feature_names.is_empty() {
            return Err(RuntimeError::EmptyResult(format!(
                "no feature columns after joining {} features (window {}, as of {})",
                selected.len(),
                window,
                reference_date
            )));
        }

        self.row_order.arrange(table.rows_mut());
        debug!("Row order: {}", self.row_order.name());

        self.imputation.impute(&mut table);
        let dropped = table.drop_incomplete();
        info!(
            "Dataset has {} rows and {} features ({} incomplete rows dropped, imputation: {})",
            table.len(),
            feature_names.len(),
            dropped,
            self.imputation.name()
        );

        if table.is_empty() {
            return Err(RuntimeError::EmptyResult(format!(
                "all {} labeled rows were incomplete after joining {} features (window {}, as of {})",
                dropped,
                selected.len(),
                window,
                reference_date
            )));
        }

        Ok(Dataset::from_complete_table(table, feature_names))
    }

    async fn load_features(
        &self,
        names: &[&str],
        reference_date: NaiveDate,
    ) -> Result<Vec<(NormalizedFeatureFrame, Vec<String>)>> {
        if self.parallel_loads {
            // try_join_all yields results in input order
            return try_join_all(
                names
                    .iter()
                    .map(|name| self.features.load(name, reference_date)),
            )
            .await;
        }

        let mut loaded = Vec::with_capacity(names.len());
        for name in names {
            loaded.push(self.features.load(name, reference_date).await?);
        }
        Ok(loaded)
    }
}
