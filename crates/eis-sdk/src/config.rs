//! Experiment configuration
//!
//! One `ExperimentConfig` describes a single dataset build: where the data
//! lives, which features to evaluate, the label window and the "fake today"
//! the features are computed as of.

use crate::error::{Result, SdkError};
use chrono::NaiveDate;
use eis_core::TargetUnit;
use eis_runtime::{
    DataSourceConfig, FeatureToggles, Identity, ImputationMode, LabelWindow, RowOrder,
    SeededShuffle, TableConfig,
};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Prefix of environment overrides, e.g. `EIS_LOOKBACK_DAYS=90`
pub const ENV_PREFIX: &str = "EIS";

/// Experiment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentConfig {
    /// Backing store connection
    #[serde(default)]
    pub datasource: DataSourceConfig,

    /// Physical table names
    #[serde(default)]
    pub tables: TableConfig,

    /// Feature toggles, in document order
    #[serde(default)]
    pub features: FeatureToggles,

    /// Unit of analysis
    #[serde(default)]
    pub unit: TargetUnit,

    /// Labels are taken from incidents inside this window
    pub label_window: LabelWindow,

    /// Reference date features are computed as of
    pub fake_today: NaiveDate,

    /// Reference dates for feature evaluation sweeps
    #[serde(default)]
    pub fake_todays: Vec<NaiveDate>,

    /// Override of the trailing window of recent features, in days
    #[serde(default)]
    pub lookback_days: Option<i64>,

    #[serde(default)]
    pub shuffle: ShuffleConfig,

    #[serde(default)]
    pub imputation: ImputationMode,

    /// Issue feature queries concurrently
    #[serde(default)]
    pub parallel_feature_loads: bool,
}

/// Row shuffling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ShuffleConfig {
    #[serde(default = "default_shuffle_enabled")]
    pub enabled: bool,

    /// Fixed seed; drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ShuffleConfig {
    pub fn row_order(&self) -> Box<dyn RowOrder> {
        if self.enabled {
            Box::new(SeededShuffle::new(self.seed))
        } else {
            Box::new(Identity)
        }
    }
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            enabled: default_shuffle_enabled(),
            seed: None,
        }
    }
}

fn default_shuffle_enabled() -> bool {
    true
}

impl ExperimentConfig {
    /// Minimal configuration for `window` as of `fake_today`, with no
    /// features enabled
    pub fn new(label_window: LabelWindow, fake_today: NaiveDate) -> Self {
        Self {
            datasource: DataSourceConfig::default(),
            tables: TableConfig::default(),
            features: FeatureToggles::new(),
            unit: TargetUnit::default(),
            label_window,
            fake_today,
            fake_todays: Vec::new(),
            lookback_days: None,
            shuffle: ShuffleConfig::default(),
            imputation: ImputationMode::default(),
            parallel_feature_loads: false,
        }
    }

    /// Enable or disable one feature
    pub fn with_feature(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.features.set(name, enabled);
        self
    }

    pub fn with_shuffle(mut self, shuffle: ShuffleConfig) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_imputation(mut self, mode: ImputationMode) -> Self {
        self.imputation = mode;
        self
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML file, without environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Load `path` layered with `EIS_`-prefixed environment overrides.
    ///
    /// A `.env` file in the working directory is loaded first. Nested keys use
    /// a double underscore: `EIS_SHUFFLE__SEED=7`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// [`ExperimentConfig::load`] with a custom environment prefix
    pub fn load_with_prefix(path: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        info!(
            "Loaded experiment config from {}: {} features enabled, as of {}",
            path.display(),
            config.features.enabled().len(),
            config.fake_today
        );
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        self.label_window
            .validate()
            .map_err(|e| SdkError::ConfigError(e.to_string()))?;

        if let Some(days) = self.lookback_days {
            if days <= 0 {
                return Err(SdkError::ConfigError(format!(
                    "lookback_days must be positive, got {}",
                    days
                )));
            }
        }

        if self.datasource.pool_size == 0 {
            return Err(SdkError::ConfigError(
                "datasource.pool_size must be at least 1".to_string(),
            ));
        }

        if self.parallel_feature_loads && self.datasource.pool_size == 1 {
            warn!("parallel_feature_loads is set but the pool holds a single connection");
        }
        Ok(())
    }

    /// Distinct reference dates of a feature sweep, in configured order.
    ///
    /// Falls back to `fake_today` when no sweep dates are configured.
    pub fn reference_dates(&self) -> Vec<NaiveDate> {
        if self.fake_todays.is_empty() {
            return vec![self.fake_today];
        }
        let mut dates = Vec::with_capacity(self.fake_todays.len());
        for date in &self.fake_todays {
            if !dates.contains(date) {
                dates.push(*date);
            }
        }
        dates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPERIMENT: &str = r#"
datasource:
  connection_string: postgres://eis@localhost/eis
  schema: staging
tables:
  officer_table: officers_hub
features:
  height_weight: true
  arrests:
    career_arrests: true
    recent_arrests: false
  male_female: true
label_window:
  start_date: 2015-01-01
  end_date: 2015-12-31
fake_today: 2015-01-01
shuffle:
  seed: 42
imputation: declared
"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_experiment() {
        let config = ExperimentConfig::from_yaml_str(EXPERIMENT).unwrap();

        assert_eq!(config.datasource.schema, "staging");
        assert_eq!(config.datasource.pool_size, 1);
        assert_eq!(config.tables.officer_table, "officers_hub");
        assert_eq!(config.tables.si_table, "si_table");
        assert_eq!(
            config.features.enabled(),
            vec!["height_weight", "career_arrests", "male_female"]
        );
        assert_eq!(config.unit, TargetUnit::Officer);
        assert_eq!(config.label_window.start_date, date(2015, 1, 1));
        assert_eq!(config.fake_today, date(2015, 1, 1));
        assert!(config.shuffle.enabled);
        assert_eq!(config.shuffle.seed, Some(42));
        assert_eq!(config.imputation, ImputationMode::Declared);
        assert!(!config.parallel_feature_loads);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let yaml = r#"
label_window:
  start_date: 2016-01-01
  end_date: 2015-01-01
fake_today: 2015-01-01
"#;
        let err = ExperimentConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SdkError::ConfigError(_)));
    }

    #[test]
    fn test_non_positive_lookback_rejected() {
        let yaml = r#"
label_window:
  start_date: 2015-01-01
  end_date: 2015-12-31
fake_today: 2015-01-01
lookback_days: 0
"#;
        assert!(ExperimentConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_missing_fake_today_is_yaml_error() {
        let yaml = "label_window: { start_date: 2015-01-01, end_date: 2015-12-31 }";
        let err = ExperimentConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SdkError::YamlError(_)));
    }

    #[test]
    fn test_reference_dates_dedupe_in_order() {
        let window = LabelWindow::new(date(2015, 1, 1), date(2015, 12, 31)).unwrap();
        let mut config = ExperimentConfig::new(window, date(2015, 1, 1));
        assert_eq!(config.reference_dates(), vec![date(2015, 1, 1)]);

        config.fake_todays = vec![date(2014, 1, 1), date(2013, 1, 1), date(2014, 1, 1)];
        assert_eq!(
            config.reference_dates(),
            vec![date(2014, 1, 1), date(2013, 1, 1)]
        );
    }

    #[test]
    fn test_shuffle_row_order() {
        assert_eq!(ShuffleConfig::default().row_order().name(), "seeded_shuffle");
        let off = ShuffleConfig {
            enabled: false,
            seed: None,
        };
        assert_eq!(off.row_order().name(), "identity");
    }
}
