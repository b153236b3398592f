//! EIS SDK
//!
//! High-level API for building training datasets from an experiment
//! configuration: load the config, build an engine, assemble.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod telemetry;

// Re-export main types
pub use builder::EisEngineBuilder;
pub use config::{ExperimentConfig, ShuffleConfig};
pub use engine::{EisEngine, FeatureSummary};
pub use error::{Result, SdkError};
pub use telemetry::{init_tracing, DEFAULT_LOG_FILTER};

// Re-export commonly used types from dependencies
pub use eis_core::{EntityId, TargetUnit, Value};
pub use eis_runtime::{
    BackingStore, DataSourceConfig, Dataset, FeatureMatrix, FeatureToggles, ImputationMode,
    LabelWindow, MemoryStore, QueryResult, RuntimeError, TableConfig,
};
