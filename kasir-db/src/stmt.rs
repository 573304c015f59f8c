//! Prepared statements

use crate::driver::{DriverStmt, ExecResult};
use crate::error::{DbError, Result};
use crate::rows::{Row, Rows};
use crate::value::Value;

/// A statement prepared for one SQL text.
///
/// Only reachable inside [`crate::Db::with_stmt`] or
/// [`crate::Tx::with_stmt`], which close it when the scope ends. A cursor
/// returned by [`Stmt::rows`] borrows the statement, so it must be dropped
/// or closed before the statement runs again.
pub struct Stmt<'c> {
    inner: Box<dyn DriverStmt + 'c>,
}

impl<'c> Stmt<'c> {
    pub(crate) fn new(inner: Box<dyn DriverStmt + 'c>) -> Self {
        Self { inner }
    }

    /// Result column names known at prepare time
    pub fn columns(&self) -> &[String] {
        self.inner.columns()
    }

    /// Run a statement that returns no rows
    pub async fn exec(&mut self, args: &[Value]) -> Result<ExecResult> {
        self.inner.exec(args).await
    }

    /// Run the query and hand back the raw cursor
    pub async fn rows(&mut self, args: &[Value]) -> Result<Rows<'_>> {
        let inner = self.inner.query(args).await?;
        Ok(Rows::new(inner))
    }

    /// Run the query for at most one row.
    ///
    /// Never fails here; a query error is reported by the [`Row`]'s scan.
    pub async fn query_row(&mut self, args: &[Value]) -> Row<'_> {
        Row::new(self.rows(args).await)
    }

    /// Run the query and call `row_fn` for each row, in result order.
    ///
    /// Stops at the first error, whether it comes from fetching or from
    /// `row_fn`. An empty result never calls `row_fn`.
    pub async fn query<F, E>(&mut self, args: &[Value], mut row_fn: F) -> std::result::Result<(), E>
    where
        F: FnMut(&Rows<'_>) -> std::result::Result<(), E> + Send,
        E: From<DbError> + Send,
    {
        let mut rows = self.rows(args).await?;
        loop {
            match rows.next().await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    let _ = rows.close().await;
                    return Err(e.into());
                }
            }

            if let Err(e) = row_fn(&rows) {
                let _ = rows.close().await;
                return Err(e);
            }
        }

        rows.close().await?;
        Ok(())
    }

    pub(crate) async fn close(self) -> Result<()> {
        self.inner.close().await
    }
}
