//! Database connection pool management
//!
//! Uses sqlx PgPool. Pool sizing is fixed when the pool is created.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Pool sizing and connection lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolOptions {
    /// Maximum open connections
    pub max_open: u32,
    /// Connections kept open while idle
    pub max_idle: u32,
    /// Recycle connections older than this; `None` keeps them forever
    pub max_lifetime: Option<Duration>,
    /// How long a caller waits for a free connection
    pub acquire_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_open: 10,
            max_idle: 2,
            max_lifetime: Some(Duration::from_secs(30 * 60)),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl PoolOptions {
    fn to_sqlx(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_open)
            .min_connections(self.max_idle.min(self.max_open))
            .max_lifetime(self.max_lifetime)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Create a PostgreSQL connection pool with default sizing.
///
/// # Errors
///
/// Returns an error if the connection fails.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgresql://postgres@localhost:5432/kasir").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, &PoolOptions::default()).await
}

/// Create a PostgreSQL connection pool with custom sizing.
pub async fn create_pool_with_options(
    database_url: &str,
    options: &PoolOptions,
) -> Result<PgPool, sqlx::Error> {
    options.to_sqlx().connect(database_url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_never_exceeds_open() {
        let options = PoolOptions {
            max_open: 1,
            max_idle: 5,
            ..PoolOptions::default()
        };
        let sqlx_options = options.to_sqlx();
        assert_eq!(sqlx_options.get_max_connections(), 1);
        assert_eq!(sqlx_options.get_min_connections(), 1);
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgresql://... cargo test -p kasir-db -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }
}
