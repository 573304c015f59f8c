//! Result cursors
//!
//! [`Rows`] walks a result forward one row at a time. [`Row`] is the
//! single-row form returned by [`crate::Stmt::query_row`]; it defers any
//! query error until it is scanned.

use crate::driver::DriverRows;
use crate::error::{DbError, Result};
use crate::mapper::{FromColumns, FromValues};
use crate::value::{FromValue, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    /// Not yet advanced
    Open,
    /// Positioned on a row by `next`
    OnRow,
    Exhausted,
    Closed,
    Errored,
}

/// Forward-only cursor over a query result
pub struct Rows<'s> {
    inner: Box<dyn DriverRows + 's>,
    columns: Vec<String>,
    current: Option<Vec<Value>>,
    state: CursorState,
}

impl<'s> Rows<'s> {
    pub(crate) fn new(inner: Box<dyn DriverRows + 's>) -> Self {
        let columns = inner.columns().to_vec();
        Self {
            inner,
            columns,
            current: None,
            state: CursorState::Open,
        }
    }

    /// Result column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, CursorState::Closed | CursorState::Errored)
    }

    /// Advance onto the next row.
    ///
    /// Returns `Ok(false)` once the result is exhausted and on every call
    /// after that. A fetch error moves the cursor to the errored state.
    pub async fn next(&mut self) -> Result<bool> {
        if !matches!(self.state, CursorState::Open | CursorState::OnRow) {
            return Ok(false);
        }

        match self.inner.next().await {
            Ok(Some(values)) => {
                if self.columns.is_empty() {
                    // Some drivers only learn the shape from the first row.
                    self.columns = self.inner.columns().to_vec();
                }
                self.current = Some(values);
                self.state = CursorState::OnRow;
                Ok(true)
            }
            Ok(None) => {
                self.current = None;
                self.state = CursorState::Exhausted;
                Ok(false)
            }
            Err(e) => {
                self.current = None;
                self.state = CursorState::Errored;
                Err(e)
            }
        }
    }

    fn current(&self) -> Result<&[Value]> {
        match self.state {
            CursorState::OnRow => Ok(self.current.as_deref().unwrap_or_default()),
            CursorState::Open => Err(DbError::ScanWithoutNext),
            CursorState::Exhausted => Err(DbError::NoRows),
            CursorState::Closed | CursorState::Errored => Err(DbError::RowsClosed),
        }
    }

    /// Map the current row onto `dest` through its column map.
    pub fn scan<T: FromColumns>(&self, dest: &mut T) -> Result<()> {
        let values = self.current()?;
        T::column_map().apply(dest, &self.columns, values)
    }

    /// Map the current row into a fresh `T` and push it onto `dest`.
    pub fn scan_append<T: FromColumns>(&self, dest: &mut Vec<T>) -> Result<()> {
        let mut item = T::default();
        self.scan(&mut item)?;
        dest.push(item);
        Ok(())
    }

    /// Decode the current row positionally
    pub fn scan_values<V: FromValues>(&self) -> Result<V> {
        let values = self.current()?;
        V::from_values(&self.columns, values)
    }

    /// Decode a single column of the current row by name
    pub fn get<V: FromValue>(&self, column: &str) -> Result<V> {
        let values = self.current()?;
        let idx = crate::mapper::find(&self.columns, column)
            .ok_or_else(|| DbError::ColumnNotFound(column.to_owned()))?;
        let value = values.get(idx).unwrap_or(&Value::Null);
        V::from_value(value).map_err(|source| DbError::Decode {
            column: column.to_owned(),
            source,
        })
    }

    /// Release the cursor. Calling it again is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        if self.state == CursorState::Closed {
            return Ok(());
        }
        self.state = CursorState::Closed;
        self.current = None;
        self.inner.close().await
    }
}

/// A query result limited to its first row
pub struct Row<'s> {
    rows: Result<Rows<'s>>,
}

impl<'s> Row<'s> {
    pub(crate) fn new(rows: Result<Rows<'s>>) -> Self {
        Self { rows }
    }

    /// Map the first row onto `dest`.
    ///
    /// Fails with the deferred query error if the query failed, with
    /// [`DbError::NoRows`] on an empty result, and with the cursor's close
    /// error if releasing it fails after a successful scan.
    pub async fn scan<T: FromColumns>(self, dest: &mut T) -> Result<()> {
        self.scan_with(|rows| rows.scan(dest)).await
    }

    /// Map the first row into a fresh `T`
    pub async fn scan_into<T: FromColumns>(self) -> Result<T> {
        let mut dest = T::default();
        self.scan(&mut dest).await?;
        Ok(dest)
    }

    /// Decode the first row positionally
    pub async fn scan_values<V: FromValues>(self) -> Result<V> {
        self.scan_with(|rows| rows.scan_values()).await
    }

    async fn scan_with<R>(self, f: impl FnOnce(&Rows<'s>) -> Result<R>) -> Result<R> {
        let mut rows = self.rows?;
        if rows.is_closed() {
            return Err(DbError::RowsClosed);
        }

        match rows.next().await {
            Ok(true) => {}
            Ok(false) => {
                let _ = rows.close().await;
                return Err(DbError::NoRows);
            }
            Err(e) => {
                let _ = rows.close().await;
                return Err(e);
            }
        }

        match f(&rows) {
            Ok(out) => {
                rows.close().await?;
                Ok(out)
            }
            Err(e) => {
                let _ = rows.close().await;
                Err(e)
            }
        }
    }
}
