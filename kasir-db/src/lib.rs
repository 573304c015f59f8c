//! kasir-db: thin SQL execution wrapper
//!
//! Decorates a pooled connection with two structured access patterns:
//!
//! - [`Db::with_stmt`] / [`Tx::with_stmt`]: prepare, run, always close
//! - [`Db::with_tx`]: begin, run, commit or roll back exactly once
//!
//! Rows are mapped onto caller types through an explicit [`ColumnMap`]
//! registered once per type ([`FromColumns`]), with one level of nested
//! flattening for joined projections.
//!
//! The database itself sits behind the [`driver`] traits. [`postgres`]
//! implements them over sqlx; the `testing` feature adds a scripted
//! in-memory driver.

pub mod db;
pub mod driver;
pub mod error;
pub mod log;
pub mod mapper;
pub mod pool;
pub mod postgres;
pub mod rows;
pub mod stmt;
pub mod value;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use db::{Db, Tx};
pub use driver::{Connector, ExecResult};
pub use error::{DbError, Result};
pub use log::{QueryLog, QueryLogger, Scope, TracingQueryLogger};
pub use mapper::{ColumnMap, FromColumns, FromValues};
pub use pool::PoolOptions;
pub use rows::{Row, Rows};
pub use stmt::Stmt;
pub use value::{DecodeError, FromValue, Value};

pub use once_cell::sync::Lazy;
