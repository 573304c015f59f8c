//! Database reachability

use async_trait::async_trait;
use kasir_db::{Db, DbError};

#[async_trait]
pub trait HealthRepository: Send + Sync {
    /// Round-trip to the database
    async fn ping(&self) -> Result<(), DbError>;
}

pub struct DbHealthRepository {
    db: Db,
}

impl DbHealthRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HealthRepository for DbHealthRepository {
    async fn ping(&self) -> Result<(), DbError> {
        self.db.ping().await
    }
}
