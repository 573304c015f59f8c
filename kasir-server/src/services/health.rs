//! Health service

use std::sync::Arc;

use async_trait::async_trait;
use kasir_db::DbError;

use crate::models::HealthCheck;
use crate::repos::HealthRepository;

pub const API_NAME: &str = "Connection to Kasir API";
pub const DATABASE_NAME: &str = "Connection to Kasir Database";

#[async_trait]
pub trait HealthService: Send + Sync {
    fn api(&self) -> HealthCheck;

    /// Database probe; the error is the reason it is unhealthy
    async fn db(&self) -> Result<HealthCheck, DbError>;
}

pub struct DefaultHealthService {
    repo: Arc<dyn HealthRepository>,
}

impl DefaultHealthService {
    pub fn new(repo: Arc<dyn HealthRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl HealthService for DefaultHealthService {
    fn api(&self) -> HealthCheck {
        HealthCheck::healthy(API_NAME)
    }

    async fn db(&self) -> Result<HealthCheck, DbError> {
        self.repo.ping().await?;
        Ok(HealthCheck::healthy(DATABASE_NAME))
    }
}
