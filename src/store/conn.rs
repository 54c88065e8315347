//! Database connection abstraction.

use crate::codec::{Row, SqlValue};
use crate::error::StoreError;
use async_trait::async_trait;

/// Executes generated SQL against a backing database.
///
/// Transactions nest by coalescing: only the outermost `begin` opens a real
/// transaction, and a `rollback` at any depth aborts the whole unit.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Run a statement that returns rows.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError>;

    /// Run a statement that returns an affected-row count.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, StoreError>;

    async fn begin(&self) -> Result<(), StoreError>;

    async fn commit(&self) -> Result<(), StoreError>;

    async fn rollback(&self) -> Result<(), StoreError>;
}
