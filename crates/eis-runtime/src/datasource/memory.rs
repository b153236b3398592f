//! In-memory backing store
//!
//! Serves canned results for testing and development. A response is
//! selected by the first registered pattern that occurs in the query text.

use super::query::QueryResult;
use super::store::BackingStore;
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory backing store
pub struct MemoryStore {
    name: String,
    responses: Vec<(String, QueryResult)>,
    failures: Vec<(String, String)>,
    /// Every query text received, in order
    executed: RwLock<Vec<String>>,
}

impl MemoryStore {
    /// Create an empty store; every query fails until responses are added
    pub fn new() -> Self {
        Self {
            name: "memory".to_string(),
            responses: Vec::new(),
            failures: Vec::new(),
            executed: RwLock::new(Vec::new()),
        }
    }

    /// Answer queries containing `pattern` with `result`
    pub fn with_response(mut self, pattern: impl Into<String>, result: QueryResult) -> Self {
        self.responses.push((pattern.into(), result));
        self
    }

    /// Fail queries containing `pattern` with `message`
    pub fn with_failure(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.push((pattern.into(), message.into()));
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queries executed so far
    pub async fn executed_queries(&self) -> Vec<String> {
        self.executed.read().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.executed.write().await.push(sql.to_string());

        if let Some((_, message)) = self.failures.iter().find(|(p, _)| sql.contains(p.as_str())) {
            return Err(RuntimeError::query(&self.name, message.clone()));
        }

        match self.responses.iter().find(|(p, _)| sql.contains(p.as_str())) {
            Some((_, result)) => {
                let mut result = result.clone();
                result.source = self.name.clone();
                Ok(result)
            }
            None => Err(RuntimeError::query(
                &self.name,
                format!("no canned response for query: {}", sql),
            )),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
