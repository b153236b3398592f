//! EIS Runtime - Temporal feature evaluation and dataset assembly
//!
//! This crate evaluates officer features as of a reference date against a
//! relational backing store, normalizes them per entity and assembles them
//! with ground-truth labels into training datasets.

pub mod dataset;
pub mod datasource;
pub mod error;
pub mod feature;
pub mod labels;

// Re-export main types
pub use dataset::{
    Dataset, DatasetAssembler, DeclaredPolicy, DropIncomplete, FeatureMatrix, FeatureToggles,
    Identity, ImputationMode, ImputationStrategy, RowOrder, SeededShuffle,
};
pub use datasource::{BackingStore, DataSourceConfig, MemoryStore, QueryResult};
#[cfg(feature = "sqlx")]
pub use datasource::SqlStore;
pub use error::{Result, RuntimeError};
pub use feature::{
    CategoricalExpander, EvalParams, FeatureDescriptor, FeatureLoader, FeatureName,
    FeatureRegistry, Scope, TableConfig,
};
pub use labels::{LabelFrame, LabelLoader, LabelRow, LabelWindow};
