//! Backing store trait

use super::query::QueryResult;
use crate::error::Result;
use async_trait::async_trait;

/// Read-only relational store the feature and label queries run against.
///
/// Implementations must surface malformed queries, lost connections and
/// backend failures as [`RuntimeError::QueryExecution`](crate::RuntimeError)
/// rather than hanging or returning partial results.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Execute one read-only query
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Store name for logs and errors
    fn name(&self) -> &str;
}
