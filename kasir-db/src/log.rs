//! Query logging
//!
//! One [`QueryLog`] entry is produced per scoped statement or transaction.
//! Entries go to an injected [`QueryLogger`]; the default forwards them to
//! `tracing`.

use std::fmt;

/// Where the logged work ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Directly on the pool
    Conn,
    /// Inside a transaction
    Tx,
}

/// A single query log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLog {
    pub scope: Scope,
    /// SQL text, or `COMMIT` / `ROLLBACK` for transaction outcomes
    pub query: String,
    /// Terminal error, if any
    pub error: Option<String>,
}

impl QueryLog {
    pub fn new(scope: Scope, query: impl Into<String>, error: Option<String>) -> Self {
        Self {
            scope,
            query: query.into(),
            error,
        }
    }
}

impl fmt::Display for QueryLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope == Scope::Tx {
            write!(f, "tx: ")?;
        }
        write!(
            f,
            "query: {}, err: {}",
            self.query,
            self.error.as_deref().unwrap_or("<nil>")
        )
    }
}

/// Sink for query log entries
pub trait QueryLogger: Send + Sync {
    fn log(&self, entry: &QueryLog);
}

/// Forwards entries to `tracing` on the `kasir_db::query` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingQueryLogger;

impl QueryLogger for TracingQueryLogger {
    fn log(&self, entry: &QueryLog) {
        match &entry.error {
            None => tracing::info!(target: "kasir_db::query", "{}", entry),
            Some(_) => tracing::warn!(target: "kasir_db::query", "{}", entry),
        }
    }
}
