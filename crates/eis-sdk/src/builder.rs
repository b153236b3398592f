//! Builder pattern for EisEngine

use crate::config::ExperimentConfig;
use crate::engine::EisEngine;
use crate::error::{Result, SdkError};
use eis_runtime::{BackingStore, DatasetAssembler, RowOrder};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Builder for EisEngine
///
/// # Example
///
/// ```rust,ignore
/// use eis_sdk::EisEngineBuilder;
///
/// // Layered file + environment configuration, Postgres store
/// let engine = EisEngineBuilder::new()
///     .with_config_file("experiments/default.yaml")
///     .build()
///     .await?;
///
/// // Injected store (tests, notebooks)
/// let engine = EisEngineBuilder::new()
///     .with_config(config)
///     .with_store(Arc::new(store))
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct EisEngineBuilder {
    config: Option<ExperimentConfig>,
    config_file: Option<PathBuf>,
    store: Option<Arc<dyn BackingStore>>,
    row_order: Option<Box<dyn RowOrder>>,
}

impl EisEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an already loaded configuration
    pub fn with_config(mut self, config: ExperimentConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the configuration from `path` (plus environment overrides) at build time
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Use `store` instead of connecting to the configured data source
    pub fn with_store(mut self, store: Arc<dyn BackingStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the row order derived from the shuffle settings
    pub fn with_row_order(mut self, row_order: Box<dyn RowOrder>) -> Self {
        self.row_order = Some(row_order);
        self
    }

    /// Build the engine
    pub async fn build(self) -> Result<EisEngine> {
        let config = match (self.config, self.config_file) {
            (Some(config), _) => {
                config.validate()?;
                config
            }
            (None, Some(path)) => ExperimentConfig::load(path)?,
            (None, None) => {
                return Err(SdkError::ConfigError(
                    "no experiment configuration supplied".to_string(),
                ))
            }
        };

        let store = match self.store {
            Some(store) => store,
            None => connect(&config).await?,
        };
        info!("✓ Using backing store '{}'", store.name());

        let row_order = self
            .row_order
            .unwrap_or_else(|| config.shuffle.row_order());

        let assembler = DatasetAssembler::new(store, config.tables.clone())
            .with_unit(config.unit)
            .with_lookback(config.lookback_days)
            .with_row_order(row_order)
            .with_imputation(config.imputation.strategy())
            .with_parallel_loads(config.parallel_feature_loads);

        Ok(EisEngine::new(config, assembler))
    }
}

#[cfg(feature = "sqlx")]
async fn connect(config: &ExperimentConfig) -> Result<Arc<dyn BackingStore>> {
    let store = eis_runtime::SqlStore::connect(&config.datasource).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlx"))]
async fn connect(config: &ExperimentConfig) -> Result<Arc<dyn BackingStore>> {
    Err(SdkError::ConfigError(format!(
        "data source '{}' requires the `sqlx` feature; supply a store with `with_store` instead",
        config.datasource.name
    )))
}
