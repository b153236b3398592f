//! Feature definitions and evaluation
//!
//! - `catalog` / `queries` - the closed set of officer features and their SQL
//! - `definition` - evaluation-ready descriptors bound to a reference date
//! - `registry` - name lookup
//! - `categorical` - indicator expansion of nominal features
//! - `loader` - query, deduplicate, normalize

pub mod catalog;
pub mod categorical;
pub mod definition;
pub mod loader;
mod queries;
pub mod registry;
pub mod tables;

pub use catalog::FeatureName;
pub use categorical::CategoricalExpander;
pub use definition::{
    EvalParams, FeatureDescriptor, OutputColumn, QueryBounds, QueryBuilder, Scope,
    RECENT_WINDOW_DAYS, SERIES_WINDOW_DAYS,
};
pub use loader::FeatureLoader;
pub use registry::FeatureRegistry;
pub use tables::TableConfig;
