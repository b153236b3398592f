//! EisEngine - dataset building and feature evaluation

use crate::config::ExperimentConfig;
use crate::error::Result;
use chrono::NaiveDate;
use eis_runtime::{Dataset, DatasetAssembler, LabelWindow, RuntimeError};
use serde::Serialize;
use tracing::info;

/// Outcome of evaluating one feature as of one reference date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub feature: String,
    pub reference_date: NaiveDate,
    /// Distinct entities with a value
    pub rows: usize,
    /// Columns the feature contributes
    pub columns: Vec<String>,
}

/// Configured engine for one experiment
pub struct EisEngine {
    config: ExperimentConfig,
    assembler: DatasetAssembler,
}

impl EisEngine {
    pub(crate) fn new(config: ExperimentConfig, assembler: DatasetAssembler) -> Self {
        Self { config, assembler }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn assembler(&self) -> &DatasetAssembler {
        &self.assembler
    }

    /// Build the configured dataset: labels from `label_window`, features as
    /// of `fake_today`
    pub async fn build_dataset(&self) -> Result<Dataset> {
        self.build_dataset_for(&self.config.label_window, self.config.fake_today)
            .await
    }

    /// Build a dataset for another window or reference date with the same
    /// feature selection
    pub async fn build_dataset_for(
        &self,
        window: &LabelWindow,
        reference_date: NaiveDate,
    ) -> Result<Dataset> {
        let dataset = self
            .assembler
            .assemble(&self.config.features, window, reference_date)
            .await?;
        info!(
            "Built dataset: {} rows x {} features (labels {}, as of {})",
            dataset.len(),
            dataset.feature_names.len(),
            window,
            reference_date
        );
        Ok(dataset)
    }

    /// Load every enabled feature as of every distinct date in
    /// `reference_dates`, date-major.
    pub async fn evaluate_features(&self, reference_dates: &[NaiveDate]) -> Result<Vec<FeatureSummary>> {
        let features = self.config.features.enabled();
        if features.is_empty() {
            return Err(RuntimeError::EmptyResult("no features enabled".to_string()).into());
        }

        let mut dates: Vec<NaiveDate> = Vec::with_capacity(reference_dates.len());
        for date in reference_dates {
            if !dates.contains(date) {
                dates.push(*date);
            }
        }

        let loader = self.assembler.feature_loader();
        let mut summaries = Vec::with_capacity(dates.len() * features.len());
        for date in dates {
            info!("Evaluating {} features as of {}", features.len(), date);
            for name in &features {
                let (frame, columns) = loader.load(name, date).await?;
                summaries.push(FeatureSummary {
                    feature: name.to_string(),
                    reference_date: date,
                    rows: frame.len(),
                    columns,
                });
            }
        }
        Ok(summaries)
    }

    /// [`EisEngine::evaluate_features`] over the configured sweep dates
    pub async fn evaluate_configured_features(&self) -> Result<Vec<FeatureSummary>> {
        let dates = self.config.reference_dates();
        self.evaluate_features(&dates).await
    }
}
