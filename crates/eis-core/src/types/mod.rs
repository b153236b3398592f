//! Type definitions

pub mod entity;
pub mod feature;
pub mod frame;
pub mod value;

pub use entity::EntityId;
pub use feature::{FeatureKind, ImputationPolicy, TargetUnit};
pub use frame::{NormalizedFeatureFrame, RawFeatureFrame, RawRow};
pub use value::Value;
