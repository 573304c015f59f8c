//! PostgreSQL driver over sqlx
//!
//! Statements are prepared on a connection taken from the pool (or on the
//! transaction's connection) and keep that connection until they are
//! closed. Preparing also records the parameter types PostgreSQL inferred,
//! and arguments are encoded as those types when bound.

use std::ops::DerefMut;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{
    Column, Connection, Either, Executor, PgConnection, PgPool, Postgres, Row, Statement,
    Transaction, TypeInfo,
};

use crate::driver::{Connector, DriverRows, DriverStmt, DriverTx, ExecResult};
use crate::error::{DbError, Result};
use crate::pool::{create_pool_with_options, PoolOptions};
use crate::value::{DecodeError, FromValue, Value};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// [`Connector`] over a sqlx [`PgPool`]
#[derive(Debug, Clone)]
pub struct PgConnector {
    pool: PgPool,
}

impl PgConnector {
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, options: &PoolOptions) -> Result<Self> {
        let pool = create_pool_with_options(database_url, options).await?;
        Ok(Self::from_pool(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn prepare(&self, query: &str) -> Result<Box<dyn DriverStmt>> {
        let mut conn = self.pool.acquire().await?;
        let shape = describe(&mut conn, query).await?;
        Ok(Box::new(PgStmt::new(conn, query, shape)))
    }

    async fn begin(&self) -> Result<Box<dyn DriverTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl DriverTx for PgTx {
    async fn prepare<'t>(&'t mut self, query: &str) -> Result<Box<dyn DriverStmt + 't>> {
        let conn: &'t mut PgConnection = &mut self.tx;
        let shape = describe(&mut *conn, query).await?;
        Ok(Box::new(PgStmt::new(conn, query, shape)))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let PgTx { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let PgTx { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}

/// Column names and parameter type names of a prepared statement
struct Shape {
    columns: Vec<String>,
    params: Vec<String>,
}

async fn describe(conn: &mut PgConnection, query: &str) -> Result<Shape> {
    let statement = conn.prepare(query).await?;
    let columns = statement
        .columns()
        .iter()
        .map(|c| c.name().to_owned())
        .collect();
    let params = match statement.parameters() {
        Some(Either::Left(types)) => types.iter().map(|t| t.name().to_owned()).collect(),
        _ => Vec::new(),
    };
    Ok(Shape { columns, params })
}

struct PgStmt<C> {
    conn: C,
    sql: String,
    columns: Vec<String>,
    params: Vec<String>,
}

impl<C> PgStmt<C> {
    fn new(conn: C, sql: &str, shape: Shape) -> Self {
        Self {
            conn,
            sql: sql.to_owned(),
            columns: shape.columns,
            params: shape.params,
        }
    }
}

#[async_trait]
impl<C> DriverStmt for PgStmt<C>
where
    C: DerefMut<Target = PgConnection> + Send,
{
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult> {
        let query = bind_all(sqlx::query(&self.sql), &self.params, args)?;
        let done = query.execute(&mut *self.conn).await?;
        Ok(ExecResult {
            rows_affected: done.rows_affected(),
        })
    }

    async fn query<'s>(&'s mut self, args: &[Value]) -> Result<Box<dyn DriverRows + 's>> {
        let query = bind_all(sqlx::query(&self.sql), &self.params, args)?;
        let stream = query.fetch(&mut *self.conn);
        Ok(Box::new(PgRows {
            columns: self.columns.clone(),
            stream,
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        // The connection goes back to the pool (or stays with its
        // transaction) when `conn` drops; sqlx keeps the statement cached.
        Ok(())
    }
}

struct PgRows<'c> {
    columns: Vec<String>,
    stream: BoxStream<'c, std::result::Result<PgRow, sqlx::Error>>,
}

#[async_trait]
impl<'c> DriverRows for PgRows<'c> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Result<Option<Vec<Value>>> {
        match self.stream.try_next().await? {
            Some(row) => Ok(Some(decode_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.stream = Box::pin(futures::stream::empty());
        Ok(())
    }
}

fn decode_row(row: &PgRow) -> Result<Vec<Value>> {
    (0..row.len()).map(|idx| decode_column(row, idx)).collect()
}

fn decode_column(row: &PgRow, idx: usize) -> Result<Value> {
    let value = match row.column(idx).type_info().name() {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Value::Bool),
        "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(|v| Value::Int(v.into())),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(|v| Value::Int(v.into())),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Value::Int),
        "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(|v| Value::Float(v.into())),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(Value::Float),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(Value::Timestamp),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(|v| Value::Timestamp(v.and_utc())),
        _ => row.try_get::<Option<String>, _>(idx)?.map(Value::Text),
    };
    Ok(value.unwrap_or(Value::Null))
}

fn bind_all<'q>(mut query: PgQuery<'q>, params: &[String], args: &[Value]) -> Result<PgQuery<'q>> {
    for (idx, arg) in args.iter().enumerate() {
        let param = params.get(idx).map(String::as_str).unwrap_or_default();
        query = bind_value(query, param, arg).map_err(|e| {
            DbError::driver(format!("sql: converting argument ${} type: {}", idx + 1, e))
        })?;
    }
    Ok(query)
}

/// Bind `arg` encoded as the parameter type PostgreSQL inferred.
/// Unknown parameter types fall back to the value's own type.
fn bind_value<'q>(
    query: PgQuery<'q>,
    param: &str,
    arg: &Value,
) -> std::result::Result<PgQuery<'q>, DecodeError> {
    let query = match param {
        "BOOL" => query.bind(Option::<bool>::from_value(arg)?),
        "INT2" => {
            let wide = Option::<i32>::from_value(arg)?;
            let narrow = wide
                .map(i16::try_from)
                .transpose()
                .map_err(|_| DecodeError::invalid("int16", arg))?;
            query.bind(narrow)
        }
        "INT4" => query.bind(Option::<i32>::from_value(arg)?),
        "INT8" => query.bind(Option::<i64>::from_value(arg)?),
        "FLOAT4" => query.bind(Option::<f64>::from_value(arg)?.map(|v| v as f32)),
        "FLOAT8" => query.bind(Option::<f64>::from_value(arg)?),
        "TIMESTAMPTZ" => query.bind(Option::<DateTime<Utc>>::from_value(arg)?),
        "TIMESTAMP" => query.bind(Option::<DateTime<Utc>>::from_value(arg)?.map(|v| v.naive_utc())),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => query.bind(Option::<String>::from_value(arg)?),
        _ => match arg {
            // Untyped NULL binds as TEXT
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(*v),
            Value::Int(v) => query.bind(*v),
            Value::Float(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.clone()),
            Value::Timestamp(v) => query.bind(*v),
        },
    };
    Ok(query)
}
