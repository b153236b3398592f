//! Feature loading
//!
//! Evaluates one feature against the backing store and normalizes the result
//! into a per-entity numeric frame.

use crate::datasource::{BackingStore, QueryResult};
use crate::error::{Result, RuntimeError};
use crate::feature::categorical::CategoricalExpander;
use crate::feature::definition::{EvalParams, FeatureDescriptor};
use crate::feature::registry::FeatureRegistry;
use chrono::NaiveDate;
use eis_core::{EntityId, FeatureKind, NormalizedFeatureFrame, RawFeatureFrame, TargetUnit, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Loads individual features as of a reference date
#[derive(Clone)]
pub struct FeatureLoader {
    store: Arc<dyn BackingStore>,
    registry: FeatureRegistry,
    expander: CategoricalExpander,
    lookback_days: Option<i64>,
    unit: TargetUnit,
}

impl FeatureLoader {
    pub fn new(store: Arc<dyn BackingStore>, registry: FeatureRegistry) -> Self {
        Self {
            store,
            registry,
            expander: CategoricalExpander::new(),
            lookback_days: None,
            unit: TargetUnit::Officer,
        }
    }

    pub fn with_lookback(mut self, days: Option<i64>) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_unit(mut self, unit: TargetUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    fn params(&self, reference_date: NaiveDate) -> EvalParams {
        EvalParams {
            reference_date,
            lookback_days: self.lookback_days,
            unit: self.unit,
        }
    }

    /// Descriptor `name` would be loaded with as of `reference_date`
    pub fn describe(&self, name: &str, reference_date: NaiveDate) -> Result<FeatureDescriptor> {
        self.registry.lookup(name, &self.params(reference_date))
    }

    /// Load `name` as of `reference_date`.
    ///
    /// Returns a frame with at most one row per entity (the first row the
    /// store returned) and the names of the columns it contributes. Lookup
    /// failures are returned as-is; anything that fails after the query is
    /// built is wrapped in [`RuntimeError::FeatureLoad`].
    pub async fn load(
        &self,
        name: &str,
        reference_date: NaiveDate,
    ) -> Result<(NormalizedFeatureFrame, Vec<String>)> {
        let descriptor = self.describe(name, reference_date)?;

        self.load_descriptor(&descriptor)
            .await
            .map_err(|e| RuntimeError::FeatureLoad {
                feature: name.to_string(),
                reference_date,
                source: Box::new(e),
            })
    }

    async fn load_descriptor(
        &self,
        descriptor: &FeatureDescriptor,
    ) -> Result<(NormalizedFeatureFrame, Vec<String>)> {
        let sql = descriptor.query();
        debug!("Feature {} SQL: {}", descriptor.name(), sql);

        let result = self.store.execute_query(&sql).await?;
        let raw = self.to_raw_frame(descriptor, &result)?;
        let raw = dedupe(raw)?;

        let (frame, names) = match descriptor.kind() {
            FeatureKind::Categorical => self.expander.expand(&raw)?,
            FeatureKind::Series => {
                let slots = descriptor.series_slots().unwrap_or(1);
                flatten_series(&raw, slots)?
            }
            FeatureKind::Scalar => numeric_frame(&raw)?,
        };

        info!(
            "Loaded feature {}: {} rows, {} columns",
            descriptor.name(),
            frame.len(),
            names.len()
        );
        Ok((frame, names))
    }

    fn to_raw_frame(&self, descriptor: &FeatureDescriptor, result: &QueryResult) -> Result<RawFeatureFrame> {
        let id_column = &descriptor.tables().id_column;

        if !result.is_empty() {
            let expected = std::iter::once(id_column.as_str())
                .chain(descriptor.columns().iter().map(|c| c.source.as_str()));
            for column in expected {
                if !result.columns.iter().any(|c| c == column) {
                    return Err(RuntimeError::query(
                        &result.source,
                        format!("result is missing column '{}'", column),
                    ));
                }
            }
        }

        let mut raw = RawFeatureFrame::new(descriptor.sub_feature_names());
        let mut skipped = 0;
        for i in 0..result.len() {
            let id = result.get(i, id_column);
            if id.is_null() {
                skipped += 1;
                continue;
            }
            let entity = EntityId::from_value(id)?;
            let values = descriptor
                .columns()
                .iter()
                .map(|c| result.get(i, &c.source).clone())
                .collect();
            raw.push(entity, values)?;
        }

        if skipped > 0 {
            warn!(
                "Feature {}: skipped {} rows without an entity id",
                descriptor.name(),
                skipped
            );
        }
        Ok(raw)
    }
}

/// Keep the first row of every entity, in result order
fn dedupe(raw: RawFeatureFrame) -> Result<RawFeatureFrame> {
    let mut seen = HashSet::new();
    let mut unique = RawFeatureFrame::new(raw.columns().to_vec());
    for row in raw.rows() {
        if seen.insert(row.entity.clone()) {
            unique.push(row.entity.clone(), row.values.clone())?;
        }
    }
    let dropped = raw.len() - unique.len();
    if dropped > 0 {
        debug!("Dropped {} duplicate rows", dropped);
    }
    Ok(unique)
}

fn numeric_frame(raw: &RawFeatureFrame) -> Result<(NormalizedFeatureFrame, Vec<String>)> {
    let names = raw.columns().to_vec();
    let mut frame = NormalizedFeatureFrame::new(names.clone());
    for row in raw.rows() {
        let values = row
            .values
            .iter()
            .map(Value::to_f64)
            .collect::<eis_core::error::Result<Vec<_>>>()?;
        frame.insert(row.entity.clone(), values)?;
    }
    Ok((frame, names))
}

/// Spread each series array over `<column>_<slot>` columns, slot 0 oldest.
///
/// Longer arrays keep their most recent `slots` values; shorter ones leave the
/// trailing slots missing.
fn flatten_series(raw: &RawFeatureFrame, slots: usize) -> Result<(NormalizedFeatureFrame, Vec<String>)> {
    let base = raw.columns().first().cloned().unwrap_or_default();
    let names: Vec<String> = (0..slots).map(|i| format!("{}_{}", base, i)).collect();
    let mut frame = NormalizedFeatureFrame::new(names.clone());

    for row in raw.rows() {
        let mut values = vec![None; slots];
        match &row.values[0] {
            Value::Null => {}
            Value::Array(items) => {
                let skip = items.len().saturating_sub(slots);
                for (slot, item) in items[skip..].iter().enumerate() {
                    values[slot] = item.to_f64()?;
                }
            }
            other => {
                return Err(RuntimeError::TypeError(format!(
                    "series '{}' expected an array for {}, got {}",
                    base, row.entity, other
                )))
            }
        }
        frame.insert(row.entity.clone(), values)?;
    }
    Ok((frame, names))
}
