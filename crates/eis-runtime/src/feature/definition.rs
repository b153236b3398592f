//! Feature Definition Module
//!
//! A `FeatureDescriptor` is the immutable, evaluation-ready form of one
//! catalog feature: what it computes, how its output is post-processed, and
//! the SQL that computes it as of a single reference date.

use crate::feature::tables::TableConfig;
use chrono::{Datelike, Duration, NaiveDate};
use eis_core::{FeatureKind, ImputationPolicy, TargetUnit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Trailing window of "recent" variants, in days
pub const RECENT_WINDOW_DAYS: i64 = 365;

/// Window covered by per-year series features, in days (eight years)
pub const SERIES_WINDOW_DAYS: i64 = 2920;

/// Temporal scope of a feature query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Time-invariant attribute
    Static,
    /// Attribute computed relative to the reference date (age, tenure)
    AsOf,
    /// Every event up to the reference date
    Career,
    /// Events in the trailing lookback window
    Recent,
    /// Career aggregate compared against the trailing window
    CareerAndRecent,
    /// Per-calendar-year counts over the series window
    Series,
}

impl Scope {
    /// First day of the query window, if the scope has a lower bound.
    ///
    /// Only the recent scopes honor a lookback override; the series window
    /// is fixed so that slot counts stay stable across runs.
    pub fn window_start(self, reference_date: NaiveDate, lookback_days: Option<i64>) -> Option<NaiveDate> {
        match self {
            Scope::Static | Scope::AsOf | Scope::Career => None,
            Scope::Recent | Scope::CareerAndRecent => Some(
                reference_date - Duration::days(lookback_days.unwrap_or(RECENT_WINDOW_DAYS)),
            ),
            Scope::Series => Some(reference_date - Duration::days(SERIES_WINDOW_DAYS)),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scope::Static => "static",
            Scope::AsOf => "as_of",
            Scope::Career => "career",
            Scope::Recent => "recent",
            Scope::CareerAndRecent => "career_and_recent",
            Scope::Series => "series",
        };
        f.write_str(s)
    }
}

/// Parameters a feature is evaluated under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalParams {
    /// "Fake today": no event after this date may be observed
    pub reference_date: NaiveDate,
    /// Override for the trailing window of recent variants
    pub lookback_days: Option<i64>,
    pub unit: TargetUnit,
}

impl EvalParams {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            lookback_days: None,
            unit: TargetUnit::Officer,
        }
    }

    pub fn with_lookback(mut self, days: i64) -> Self {
        self.lookback_days = Some(days);
        self
    }

    pub fn with_unit(mut self, unit: TargetUnit) -> Self {
        self.unit = unit;
        self
    }
}

/// Date bounds rendered into feature SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBounds {
    pub reference_date: NaiveDate,
    pub start: Option<NaiveDate>,
}

impl QueryBounds {
    pub fn new(reference_date: NaiveDate, start: Option<NaiveDate>) -> Self {
        Self {
            reference_date,
            start,
        }
    }

    /// `column <= reference_date`
    pub fn upto(&self, column: &str) -> String {
        format!("{} <= '{}'::date", column, self.reference_date)
    }

    /// `column <= reference_date`, plus `column >= start` when bounded below
    pub fn within(&self, column: &str) -> String {
        match self.start {
            Some(start) => format!("{} and {} >= '{}'::date", self.upto(column), column, start),
            None => self.upto(column),
        }
    }

    /// Start of the window; the reference date itself when unbounded
    pub fn start_or_reference(&self) -> NaiveDate {
        self.start.unwrap_or(self.reference_date)
    }

    pub fn year(&self) -> i32 {
        self.reference_date.year()
    }

    /// Calendar years touched by `[start, reference_date]`
    pub fn calendar_years(&self) -> usize {
        (self.reference_date.year() - self.start_or_reference().year() + 1).max(1) as usize
    }
}

/// A query output column and the feature name it is published under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumn {
    /// Column alias in the generated SQL
    pub source: String,
    /// Sub-feature name exposed to the dataset
    pub name: String,
}

impl OutputColumn {
    pub fn new(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
        }
    }
}

/// Renders a feature's SQL for a table layout and date bounds
pub type QueryBuilder = fn(&TableConfig, &QueryBounds) -> String;

/// Evaluation-ready feature definition, bound to one reference date
#[derive(Clone)]
pub struct FeatureDescriptor {
    name: String,
    description: String,
    kind: FeatureKind,
    imputation: ImputationPolicy,
    scope: Scope,
    unit: TargetUnit,
    bounds: QueryBounds,
    columns: Vec<OutputColumn>,
    tables: Arc<TableConfig>,
    builder: QueryBuilder,
}

impl FeatureDescriptor {
    /// Create a descriptor evaluated under `params`
    pub fn new(
        name: impl Into<String>,
        kind: FeatureKind,
        scope: Scope,
        columns: Vec<OutputColumn>,
        params: &EvalParams,
        tables: Arc<TableConfig>,
        builder: QueryBuilder,
    ) -> Self {
        let start = scope.window_start(params.reference_date, params.lookback_days);
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            imputation: ImputationPolicy::None,
            scope,
            unit: params.unit,
            bounds: QueryBounds::new(params.reference_date, start),
            columns,
            tables,
            builder,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_imputation(mut self, imputation: ImputationPolicy) -> Self {
        self.imputation = imputation;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn imputation_policy(&self) -> ImputationPolicy {
        self.imputation
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn unit(&self) -> TargetUnit {
        self.unit
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.bounds.reference_date
    }

    /// Lower bound of the query window, if any
    pub fn window_start(&self) -> Option<NaiveDate> {
        self.bounds.start
    }

    pub fn bounds(&self) -> &QueryBounds {
        &self.bounds
    }

    pub fn tables(&self) -> &TableConfig {
        &self.tables
    }

    /// Output columns in declared order
    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    /// Declared sub-feature names, before any categorical or series expansion
    pub fn sub_feature_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of per-year slots for series features
    pub fn series_slots(&self) -> Option<usize> {
        match self.kind {
            FeatureKind::Series => Some(self.bounds.calendar_years()),
            _ => None,
        }
    }

    /// Retrieval SQL, rendered on demand
    pub fn query(&self) -> String {
        (self.builder)(&self.tables, &self.bounds)
    }
}

impl fmt::Debug for FeatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("scope", &self.scope)
            .field("imputation", &self.imputation)
            .field("reference_date", &self.bounds.reference_date)
            .field("window_start", &self.bounds.start)
            .field("columns", &self.columns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_start_per_scope() {
        let today = date(2016, 1, 1);
        assert_eq!(Scope::Career.window_start(today, Some(30)), None);
        assert_eq!(Scope::Recent.window_start(today, None), Some(date(2015, 1, 1)));
        assert_eq!(Scope::Recent.window_start(today, Some(30)), Some(date(2015, 12, 2)));
        assert_eq!(Scope::Series.window_start(today, Some(30)), Some(date(2008, 1, 3)));
    }

    #[test]
    fn test_bounds_rendering() {
        let bounds = QueryBounds::new(date(2016, 1, 1), Some(date(2015, 1, 1)));
        assert_eq!(
            bounds.within("arrest_date"),
            "arrest_date <= '2016-01-01'::date and arrest_date >= '2015-01-01'::date"
        );
        assert_eq!(bounds.upto("datet"), "datet <= '2016-01-01'::date");
        assert_eq!(bounds.calendar_years(), 2);

        let career = QueryBounds::new(date(2016, 1, 1), None);
        assert_eq!(career.within("datet"), career.upto("datet"));
        assert_eq!(career.calendar_years(), 1);
    }

    #[test]
    fn test_descriptor_renders_lazily() {
        fn builder(t: &TableConfig, b: &QueryBounds) -> String {
            format!("select {} from x where {}", t.id_column, b.upto("d"))
        }

        let params = EvalParams::new(date(2014, 6, 30));
        let descriptor = FeatureDescriptor::new(
            "sample",
            FeatureKind::Scalar,
            Scope::Career,
            vec![OutputColumn::new("c", "sample_count")],
            &params,
            Arc::new(TableConfig::default()),
            builder,
        )
        .with_imputation(ImputationPolicy::Zero);

        assert_eq!(descriptor.query(), "select newid from x where d <= '2014-06-30'::date");
        assert_eq!(descriptor.sub_feature_names(), vec!["sample_count"]);
        assert_eq!(descriptor.series_slots(), None);
        assert_eq!(descriptor.imputation_policy(), ImputationPolicy::Zero);
    }
}
