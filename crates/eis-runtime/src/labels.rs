//! Ground-truth labels
//!
//! Labels come from the supervisor investigation (SI) table: one row per
//! investigated entity in the window, with the adverse outcome flag and the
//! date the incident occurred.

use crate::datasource::BackingStore;
use crate::error::{Result, RuntimeError};
use crate::feature::tables::TableConfig;
use chrono::NaiveDate;
use eis_core::{EntityId, TargetUnit, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

const OUTCOME_COLUMN: &str = "adverse_by_ourdef";
const OCCURRED_COLUMN: &str = "dateoccured";

/// Inclusive date range labels are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl LabelWindow {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        let window = Self {
            start_date,
            end_date,
        };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_date > self.end_date {
            return Err(RuntimeError::Config(format!(
                "label window starts after it ends: {}",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for LabelWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_date, self.end_date)
    }
}

/// One labeled entity
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRow {
    pub entity: EntityId,
    pub outcome: f64,
    pub occurred_on: Option<NaiveDate>,
}

/// Labels with unique entity ids, in the order the store returned them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelFrame {
    rows: Vec<LabelRow>,
}

impl LabelFrame {
    /// Build a frame, keeping the first row of each entity
    pub fn from_rows(rows: impl IntoIterator<Item = LabelRow>) -> Self {
        let mut seen = HashSet::new();
        let rows = rows
            .into_iter()
            .filter(|row| seen.insert(row.entity.clone()))
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[LabelRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.rows.iter().map(|r| &r.entity)
    }
}

/// Loads the label frame for a window
#[derive(Clone)]
pub struct LabelLoader {
    store: Arc<dyn BackingStore>,
    tables: TableConfig,
}

impl LabelLoader {
    pub fn new(store: Arc<dyn BackingStore>, tables: TableConfig) -> Self {
        Self { store, tables }
    }

    /// Label query for `window`
    pub fn query(&self, window: &LabelWindow) -> String {
        format!(
            "SELECT {id}, {outcome}, {occurred} FROM {table} \
             WHERE {occurred} >= '{start}'::date AND {occurred} <= '{end}'::date \
             ORDER BY {occurred}, {id}",
            id = self.tables.id_column,
            outcome = OUTCOME_COLUMN,
            occurred = OCCURRED_COLUMN,
            table = self.tables.si_table,
            start = window.start_date,
            end = window.end_date,
        )
    }

    /// Load labels for `unit` within `window`.
    ///
    /// Officers and dispatch events share the SI table layout; only the
    /// meaning of the id column differs.
    pub async fn load(&self, window: &LabelWindow, unit: TargetUnit) -> Result<LabelFrame> {
        window.validate()?;
        info!("Loading {} labels for {}", unit, window);

        let sql = self.query(window);
        debug!("Label SQL: {}", sql);
        let result = self.store.execute_query(&sql).await?;

        let mut rows = Vec::with_capacity(result.len());
        let mut unusable = 0;
        for i in 0..result.len() {
            let id = result.get(i, &self.tables.id_column);
            let outcome = match result.get(i, OUTCOME_COLUMN).to_f64()? {
                Some(outcome) if !id.is_null() => outcome,
                _ => {
                    unusable += 1;
                    continue;
                }
            };
            rows.push(LabelRow {
                entity: EntityId::from_value(id)?,
                outcome,
                occurred_on: parse_date(result.get(i, OCCURRED_COLUMN)),
            });
        }

        if unusable > 0 {
            warn!("Skipped {} label rows without an id or outcome", unusable);
        }

        let total = rows.len();
        let frame = LabelFrame::from_rows(rows);
        if frame.len() < total {
            warn!(
                "Dropped {} duplicate label rows; kept the earliest per entity",
                total - frame.len()
            );
        }

        info!("Loaded {} labels", frame.len());
        Ok(frame)
    }
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?;
    let day = text.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
