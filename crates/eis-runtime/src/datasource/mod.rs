//! Backing store layer
//!
//! Feature and label queries are plain read-only SQL issued through the
//! [`BackingStore`] trait:
//! - `MemoryStore` - canned results, used in tests and demos
//! - `SqlStore` - PostgreSQL via sqlx (requires the `sqlx` feature)

pub mod config;
pub mod memory;
pub mod query;
#[cfg(feature = "sqlx")]
pub mod sql;
pub mod store;

pub use config::DataSourceConfig;
pub use memory::MemoryStore;
pub use query::QueryResult;
#[cfg(feature = "sqlx")]
pub use sql::SqlStore;
pub use store::BackingStore;
