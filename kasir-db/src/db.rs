//! Connection and transaction handles
//!
//! [`Db`] wraps the pool. All statement work goes through two scoped
//! helpers:
//!
//! - [`Db::with_stmt`] prepares a statement, hands it to a closure and
//!   closes it afterwards whatever the closure returned.
//! - [`Db::with_tx`] begins a transaction, hands it to a closure and then
//!   commits on success or rolls back on error.
//!
//! Closures return a boxed future so the statement or transaction can be
//! borrowed across `.await` points. They should own whatever they capture:
//!
//! ```ignore
//! let args = vec![Value::from(name), Value::from(description)];
//! db.with_stmt(INSERT_CATEGORY, move |stmt| {
//!     Box::pin(async move { stmt.exec(&args).await })
//! })
//! .await?;
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::driver::{Connector, DriverTx};
use crate::error::{DbError, Result};
use crate::log::{QueryLog, QueryLogger, Scope, TracingQueryLogger};
use crate::mapper::FromColumns;
use crate::pool::PoolOptions;
use crate::postgres::PgConnector;
use crate::stmt::Stmt;
use crate::value::Value;

/// Pooled database handle
#[derive(Clone)]
pub struct Db {
    conn: Arc<dyn Connector>,
    logging: bool,
    logger: Arc<dyn QueryLogger>,
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db").field("logging", &self.logging).finish_non_exhaustive()
    }
}

impl Db {
    /// Wrap a connector. Logging starts disabled.
    pub fn new(conn: impl Connector) -> Self {
        Self::from_arc(Arc::new(conn))
    }

    pub fn from_arc(conn: Arc<dyn Connector>) -> Self {
        Self {
            conn,
            logging: false,
            logger: Arc::new(TracingQueryLogger),
        }
    }

    /// Connect to PostgreSQL and wrap the resulting pool
    pub async fn connect(database_url: &str, options: &PoolOptions) -> Result<Self> {
        let conn = PgConnector::connect(database_url, options).await?;
        Ok(Self::new(conn))
    }

    /// Toggle query logging
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// Replace the query log sink
    pub fn with_logger(mut self, logger: Arc<dyn QueryLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn logging(&self) -> bool {
        self.logging
    }

    /// Prepare `query`, run `f` with the statement, then close it.
    ///
    /// A prepare failure is returned as is, unlogged, and `f` never runs.
    /// Otherwise the statement is closed even when `f` fails, one log entry
    /// is written when logging is on, and `f`'s result is returned.
    pub async fn with_stmt<F, T, E>(&self, query: &str, f: F) -> std::result::Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut Stmt<'static>) -> BoxFuture<'s, std::result::Result<T, E>> + Send,
        T: Send,
        E: From<DbError> + fmt::Display + Send,
    {
        let inner = self.conn.prepare(query).await.map_err(E::from)?;
        let mut stmt = Stmt::new(inner);

        let result = f(&mut stmt).await;
        close_stmt(stmt).await;

        log_entry(self.logging, self.logger.as_ref(), Scope::Conn, query, result.as_ref().err());
        result
    }

    /// Run `f` inside a transaction.
    ///
    /// A begin failure is returned and `f` never runs. If `f` fails the
    /// transaction is rolled back, a rollback failure is only traced, and
    /// `f`'s error is returned. If `f` succeeds the transaction is committed
    /// and the commit error, if any, is returned.
    pub async fn with_tx<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut Tx) -> BoxFuture<'t, std::result::Result<T, E>> + Send,
        T: Send,
        E: From<DbError> + fmt::Display + Send,
    {
        let inner = self.conn.begin().await.map_err(E::from)?;
        let mut tx = Tx {
            inner,
            logging: self.logging,
            logger: Arc::clone(&self.logger),
        };

        let result = f(&mut tx).await;
        let Tx { inner, .. } = tx;

        match result {
            Ok(value) => {
                let committed = inner.commit().await;
                log_entry(self.logging, self.logger.as_ref(), Scope::Tx, "COMMIT", committed.as_ref().err());
                committed.map_err(E::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = inner.rollback().await {
                    tracing::warn!(error = %rollback, "transaction rollback failed");
                }
                log_entry(self.logging, self.logger.as_ref(), Scope::Tx, "ROLLBACK", Some(&e));
                Err(e)
            }
        }
    }

    /// Fetch exactly one row mapped onto `T`
    pub async fn query_row<T>(&self, query: &str, args: Vec<Value>) -> Result<T>
    where
        T: FromColumns + Send,
    {
        self.with_stmt(query, move |stmt| {
            Box::pin(async move { stmt.query_row(&args).await.scan_into::<T>().await })
        })
        .await
    }

    /// Fetch every row mapped onto `T`
    pub async fn query_all<T>(&self, query: &str, args: Vec<Value>) -> Result<Vec<T>>
    where
        T: FromColumns + Send,
    {
        self.with_stmt(query, move |stmt| {
            Box::pin(async move {
                let mut out: Vec<T> = Vec::new();
                stmt.query::<_, DbError>(&args, |rows| rows.scan_append(&mut out)).await?;
                Ok(out)
            })
        })
        .await
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> Result<()> {
        self.conn.ping().await
    }

    /// Close the pool
    pub async fn close(&self) {
        self.conn.close().await
    }
}

/// An open transaction, only reachable inside [`Db::with_tx`]
pub struct Tx {
    inner: Box<dyn DriverTx>,
    logging: bool,
    logger: Arc<dyn QueryLogger>,
}

impl Tx {
    /// Like [`Db::with_stmt`], but prepared on the transaction's connection.
    /// Log entries are marked with the `tx:` prefix.
    pub async fn with_stmt<'t, F, T, E>(&'t mut self, query: &str, f: F) -> std::result::Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut Stmt<'t>) -> BoxFuture<'s, std::result::Result<T, E>> + Send,
        T: Send,
        E: From<DbError> + fmt::Display + Send,
    {
        let logging = self.logging;
        let logger = Arc::clone(&self.logger);

        let inner = self.inner.prepare(query).await.map_err(E::from)?;
        let mut stmt = Stmt::new(inner);

        let result = f(&mut stmt).await;
        close_stmt(stmt).await;

        log_entry(logging, logger.as_ref(), Scope::Tx, query, result.as_ref().err());
        result
    }
}

async fn close_stmt(stmt: Stmt<'_>) {
    if let Err(e) = stmt.close().await {
        tracing::warn!(error = %e, "failed to close statement");
    }
}

fn log_entry<E: fmt::Display>(
    logging: bool,
    logger: &dyn QueryLogger,
    scope: Scope,
    query: &str,
    error: Option<&E>,
) {
    if logging {
        logger.log(&QueryLog::new(scope, query, error.map(ToString::to_string)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockConnector, RecordingLogger, Script, ScriptedQuery};
    use crate::Lazy;
    use crate::mapper::ColumnMap;

    const INSERT: &str = "INSERT INTO categories (name) VALUES ($1)";
    const SELECT: &str = "SELECT id, name FROM categories";

    #[derive(Debug, Default, PartialEq)]
    struct Category {
        id: i64,
        name: String,
    }

    impl FromColumns for Category {
        fn column_map() -> &'static ColumnMap<Self> {
            static MAP: Lazy<ColumnMap<Category>> = Lazy::new(|| {
                ColumnMap::new()
                    .column("id", |c: &mut Category| &mut c.id)
                    .column("name", |c: &mut Category| &mut c.name)
            });
            &MAP
        }
    }

    fn logged(script: Script) -> (Db, MockConnector, RecordingLogger) {
        let conn = MockConnector::new(script);
        let logger = RecordingLogger::default();
        let db = Db::new(conn.clone())
            .with_logging(true)
            .with_logger(Arc::new(logger.clone()));
        (db, conn, logger)
    }

    async fn insert(db: &Db) -> Result<u64> {
        let args = vec![Value::from("Food")];
        db.with_stmt(INSERT, move |stmt| {
            Box::pin(async move { Ok(stmt.exec(&args).await?.rows_affected) })
        })
        .await
    }

    #[tokio::test]
    async fn with_stmt_closes_and_logs_once() {
        let (db, conn, logger) = logged(Script::new().with_query(INSERT, ScriptedQuery::affected(1)));

        assert_eq!(insert(&db).await.unwrap(), 1);

        let activity = conn.activity();
        assert_eq!(activity.prepared, vec![INSERT.to_string()]);
        assert_eq!(activity.closed_stmts, 1);
        assert_eq!(logger.entries(), vec![format!("query: {}, err: <nil>", INSERT)]);
    }

    #[tokio::test]
    async fn with_stmt_prepare_error_is_not_logged() {
        let (db, conn, logger) = logged(Script::new().prepare_err("prepare failed"));

        let called = std::sync::atomic::AtomicBool::new(false);
        let called = Arc::new(called);
        let flag = Arc::clone(&called);
        let err = db
            .with_stmt::<_, (), DbError>(INSERT, move |_| {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
                Box::pin(async { Ok(()) })
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "prepare failed");
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(conn.activity().closed_stmts, 0);
        assert!(logger.entries().is_empty());
    }

    #[tokio::test]
    async fn with_stmt_closes_when_closure_fails() {
        let script = Script::new().with_query(INSERT, ScriptedQuery::new(&[]).exec_err("duplicate key"));
        let (db, conn, logger) = logged(script);

        let err = insert(&db).await.unwrap_err();
        assert_eq!(err.to_string(), "duplicate key");
        assert_eq!(conn.activity().closed_stmts, 1);

        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains(INSERT));
        assert!(entries[0].contains("duplicate key"));
    }

    #[tokio::test]
    async fn with_stmt_ignores_close_error() {
        let (db, conn, _) = logged(Script::new().stmt_close_err("close failed"));
        assert!(insert(&db).await.is_ok());
        assert_eq!(conn.activity().closed_stmts, 1);
    }

    #[tokio::test]
    async fn logging_off_writes_nothing() {
        let conn = MockConnector::new(Script::new());
        let logger = RecordingLogger::default();
        let db = Db::new(conn).with_logger(Arc::new(logger.clone()));

        insert(&db).await.unwrap();
        assert!(!db.logging());
        assert!(logger.entries().is_empty());
    }

    #[tokio::test]
    async fn with_tx_commits_on_success() {
        let (db, conn, logger) = logged(Script::new().with_query(INSERT, ScriptedQuery::affected(1)));

        db.with_tx::<_, (), DbError>(|tx| {
            Box::pin(async move {
                tx.with_stmt(INSERT, |stmt| {
                    Box::pin(async move { stmt.exec(&[Value::from("Food")]).await.map(|_| ()) })
                })
                .await
            })
        })
        .await
        .unwrap();

        let activity = conn.activity();
        assert_eq!((activity.begins, activity.commits, activity.rollbacks), (1, 1, 0));
        assert_eq!(activity.closed_stmts, 1);

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with("tx: query: INSERT"));
        assert_eq!(entries[1], "tx: query: COMMIT, err: <nil>");
    }

    #[tokio::test]
    async fn with_tx_rolls_back_and_returns_closure_error() {
        let script = Script::new().rollback_err("rollback failed");
        let (db, conn, logger) = logged(script);

        let err = db
            .with_tx::<_, (), DbError>(|_| Box::pin(async { Err(DbError::driver("boom")) }))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        let activity = conn.activity();
        assert_eq!((activity.commits, activity.rollbacks), (0, 1));
        assert_eq!(logger.entries(), vec!["tx: query: ROLLBACK, err: boom".to_string()]);
    }

    #[tokio::test]
    async fn with_tx_returns_commit_error() {
        let (db, conn, logger) = logged(Script::new().commit_err("commit failed"));

        let err = db
            .with_tx::<_, i32, DbError>(|_| Box::pin(async { Ok(7) }))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "commit failed");
        assert_eq!(conn.activity().commits, 1);
        assert!(logger.entries()[0].contains("tx:"));
    }

    #[tokio::test]
    async fn with_tx_begin_error_skips_closure() {
        let (db, conn, logger) = logged(Script::new().begin_err("no connection"));

        let err = db
            .with_tx::<_, (), DbError>(|_| Box::pin(async { panic!("closure must not run") }))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "no connection");
        let activity = conn.activity();
        assert_eq!((activity.commits, activity.rollbacks), (0, 0));
        assert!(logger.entries().is_empty());
    }

    #[tokio::test]
    async fn query_helpers_map_rows() {
        let rows = ScriptedQuery::new(&["id", "name"])
            .row(vec![Value::Int(1), Value::from("Food")])
            .row(vec![Value::Int(2), Value::from("Drinks")]);
        let (db, _, _) = logged(Script::new().with_query(SELECT, rows));

        let first: Category = db.query_row(SELECT, vec![]).await.unwrap();
        assert_eq!(first, Category { id: 1, name: "Food".into() });

        let all: Vec<Category> = db.query_all(SELECT, vec![]).await.unwrap();
        assert_eq!(all.len(), 2);

        let missing = db.query_row::<Category>("SELECT 1", vec![]).await.unwrap_err();
        assert!(missing.is_no_rows());
    }

    #[tokio::test]
    async fn ping_and_close_reach_the_connector() {
        let (db, conn, _) = logged(Script::new());
        db.ping().await.unwrap();
        db.close().await;
        assert!(conn.activity().closed);
    }
}
