//! Error type for the SQL wrapper
//!
//! Driver errors pass through untouched (`Sqlx` is transparent) so callers
//! can still match on the underlying database error.

use thiserror::Error;

use crate::value::DecodeError;

/// Database wrapper error
#[derive(Debug, Error)]
pub enum DbError {
    /// Error reported by sqlx (prepare, execute, fetch, commit, rollback)
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// Error reported by a non-sqlx driver
    #[error("{0}")]
    Driver(String),

    /// A mapped field's tag names a column the result set does not have
    #[error("Could not find column '{0}'.")]
    ColumnNotFound(String),

    /// Single-row scan against an empty result
    #[error("sql: no rows in result set")]
    NoRows,

    /// Scan on a cursor that was closed or failed
    #[error("sql: Rows are closed")]
    RowsClosed,

    /// Scan before the cursor was advanced onto a row
    #[error("sql: Scan called without calling Next")]
    ScanWithoutNext,

    /// Column value could not be decoded into the destination type
    #[error("sql: Scan error on column \"{column}\": {source}")]
    Decode {
        column: String,
        #[source]
        source: DecodeError,
    },

    /// Positional scan with the wrong number of destinations
    #[error("sql: expected {expected} destination arguments in Scan, not {got}")]
    ColumnCount { expected: usize, got: usize },
}

/// Result alias for wrapper operations
pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    /// Create a driver error from any message
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }

    /// Whether this is the single-row "no rows" condition
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows | Self::Sqlx(sqlx::Error::RowNotFound))
    }
}
