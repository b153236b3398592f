//! EIS Core - Data model for the EIS temporal feature store
//!
//! This crate provides the fundamental types shared by the loaders and the
//! dataset assembler:
//! - Value types for raw query cells
//! - Entity identifiers
//! - Feature kinds, imputation policies and target units
//! - Raw and normalized per-entity feature frames
//! - Error types

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use types::{
    EntityId, FeatureKind, ImputationPolicy, NormalizedFeatureFrame, RawFeatureFrame, RawRow,
    TargetUnit, Value,
};
