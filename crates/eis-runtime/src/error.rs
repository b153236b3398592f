//! Runtime error types

use eis_core::{CoreError, TargetUnit};
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Requested feature name is not in the registry
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// Feature exists but is not defined for the requested unit
    #[error("Feature '{feature}' is not defined for unit '{unit}'")]
    UnsupportedUnit { feature: String, unit: TargetUnit },

    /// Backing store failure
    #[error("Query failed on '{source_name}': {message}")]
    QueryExecution {
        source_name: String,
        message: String,
    },

    /// Failure while loading a single feature
    #[error("Failed to load feature '{feature}' as of {reference_date}: {source}")]
    FeatureLoad {
        feature: String,
        reference_date: chrono::NaiveDate,
        #[source]
        source: Box<RuntimeError>,
    },

    /// Two joined features produced the same output column
    #[error("Duplicate feature column '{0}'")]
    DuplicateColumn(String),

    /// Nothing usable to assemble
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Non-numeric value where a number is required
    #[error("Type error: {0}")]
    TypeError(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CoreError> for RuntimeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TypeError(msg) => RuntimeError::TypeError(msg),
            other => RuntimeError::TypeError(other.to_string()),
        }
    }
}

impl RuntimeError {
    /// Build a backing store error
    pub fn query(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::QueryExecution {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Innermost error, unwrapping `FeatureLoad` context
    pub fn root_cause(&self) -> &RuntimeError {
        match self {
            RuntimeError::FeatureLoad { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
