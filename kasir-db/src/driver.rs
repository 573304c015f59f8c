//! Driver seam
//!
//! The wrapper never talks to a database directly. It drives these traits,
//! which [`crate::postgres`] implements over sqlx and `crate::testing`
//! implements as a scripted in-memory database.
//!
//! Statement and cursor lifetimes are carried in the trait objects: a
//! statement prepared inside a transaction borrows the transaction, and a
//! cursor borrows its statement.

use async_trait::async_trait;

use crate::error::Result;
use crate::value::Value;

/// Outcome of a non-query statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
}

/// Pooled connection source
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Prepare a statement on a connection taken from the pool
    async fn prepare(&self, query: &str) -> Result<Box<dyn DriverStmt>>;

    /// Begin a transaction on a connection taken from the pool
    async fn begin(&self) -> Result<Box<dyn DriverTx>>;

    /// Round-trip to the database
    async fn ping(&self) -> Result<()>;

    /// Close the pool
    async fn close(&self);
}

/// An open transaction
#[async_trait]
pub trait DriverTx: Send {
    async fn prepare<'t>(&'t mut self, query: &str) -> Result<Box<dyn DriverStmt + 't>>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// A prepared statement
#[async_trait]
pub trait DriverStmt: Send {
    /// Result column names, empty for statements that return nothing
    fn columns(&self) -> &[String];

    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult>;

    async fn query<'s>(&'s mut self, args: &[Value]) -> Result<Box<dyn DriverRows + 's>>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// A forward-only result cursor
#[async_trait]
pub trait DriverRows: Send {
    fn columns(&self) -> &[String];

    /// Fetch the next row, `None` once the result is exhausted
    async fn next(&mut self) -> Result<Option<Vec<Value>>>;

    /// Release the cursor; safe to call more than once
    async fn close(&mut self) -> Result<()>;
}
