//! PostgreSQL backing store
//!
//! Wraps a `sqlx::PgPool`. Each pooled connection is pinned to the configured
//! schema on connect, so feature SQL can use bare table names.

use super::config::DataSourceConfig;
use super::query::QueryResult;
use super::store::BackingStore;
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use eis_core::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, Row};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// PostgreSQL store
pub struct SqlStore {
    name: String,
    pool: sqlx::PgPool,
}

impl SqlStore {
    /// Open a connection pool for `config`
    pub async fn connect(config: &DataSourceConfig) -> Result<Self> {
        tracing::info!("Creating PostgreSQL connection pool for '{}'", config.name);

        let schema = config.schema.clone();
        let statement_timeout = config.statement_timeout_ms;
        let pool_size = config.pool_size.max(1);

        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_millis(config.timeout_ms))
            .after_connect(move |conn, _meta| {
                let schema = schema.clone();
                Box::pin(async move {
                    let set_path = format!("SET search_path TO {}", schema);
                    sqlx::query(&set_path).execute(&mut *conn).await?;
                    if let Some(ms) = statement_timeout {
                        let set_timeout = format!("SET statement_timeout = {}", ms);
                        sqlx::query(&set_timeout).execute(&mut *conn).await?;
                    }
                    Ok(())
                })
            })
            .connect(&config.connection_string)
            .await
            .map_err(|e| {
                RuntimeError::query(&config.name, format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        tracing::info!(
            "✓ PostgreSQL connection pool created (schema: {}, max_connections: {})",
            config.schema,
            pool_size
        );

        Ok(Self {
            name: config.name.clone(),
            pool,
        })
    }

    /// Release all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl BackingStore for SqlStore {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        tracing::debug!("Executing PostgreSQL query: {}", sql);
        let start = Instant::now();

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RuntimeError::query(&self.name, e.to_string()))?;

        let execution_time_ms = start.elapsed().as_millis() as u64;

        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let mut result_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut map = HashMap::new();
            for (idx, column) in row.columns().iter().enumerate() {
                map.insert(column.name().to_string(), decode_cell(row, idx));
            }
            result_rows.push(map);
        }

        tracing::debug!("{} rows in {}ms", result_rows.len(), execution_time_ms);

        Ok(QueryResult {
            columns,
            rows: result_rows,
            execution_time_ms,
            source: self.name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn decimal_to_value(bd: bigdecimal::BigDecimal) -> Value {
    bd.to_string()
        .parse::<f64>()
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Decode one cell by probing the types feature queries produce.
///
/// Aggregates over no rows come back as NULL; numeric is read through
/// BigDecimal; `array_agg` series arrive as integer or numeric arrays.
fn decode_cell(row: &PgRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<bigdecimal::BigDecimal>, _>(idx) {
        v.map(decimal_to_value).unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        v.map(|n| Value::Number(n as f64)).unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        v.map(|n| Value::Number(n as f64)).unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        v.map(Value::Number).unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        v.map(Value::String).unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        v.map(Value::Bool).unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(idx) {
        v.map(|d| Value::String(d.to_string())).unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        v.map(|dt| Value::String(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).to_rfc3339()))
            .unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<Vec<i64>>, _>(idx) {
        v.map(Value::from).unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<Vec<i32>>, _>(idx) {
        v.map(|items| Value::Array(items.into_iter().map(|n| Value::Number(n as f64)).collect()))
            .unwrap_or(Value::Null)
    } else if let Ok(v) = row.try_get::<Option<Vec<bigdecimal::BigDecimal>>, _>(idx) {
        v.map(|items| Value::Array(items.into_iter().map(decimal_to_value).collect()))
            .unwrap_or(Value::Null)
    } else {
        tracing::warn!(
            "Failed to extract value for column {}. Tried: numeric, int8, int4, float8, text, bool, date, timestamp, arrays",
            idx
        );
        Value::Null
    }
}
