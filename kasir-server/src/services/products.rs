//! Product service

use std::sync::Arc;

use async_trait::async_trait;

use super::ServiceError;
use crate::models::{HealthCheck, ProductRequest, ProductResponse};
use crate::repos::ProductRepository;

#[async_trait]
pub trait ProductService: Send + Sync {
    /// Fails with [`ServiceError::CategoryNotFound`] when `category_id` is unknown
    async fn create_product(&self, request: &ProductRequest) -> Result<(), ServiceError>;

    async fn update_product(&self, id: i64, request: &ProductRequest) -> Result<(), ServiceError>;

    async fn delete_product(&self, id: i64) -> Result<(), ServiceError>;

    async fn get_product_by_id(&self, id: i64) -> Result<ProductResponse, ServiceError>;

    async fn get_all_products(&self) -> Result<Vec<ProductResponse>, ServiceError>;

    fn api(&self) -> HealthCheck;
}

pub struct DefaultProductService {
    repo: Arc<dyn ProductRepository>,
}

impl DefaultProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    async fn ensure_product(&self, id: i64) -> Result<(), ServiceError> {
        match self.repo.get_product_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::ProductNotFound),
        }
    }

    async fn ensure_category(&self, id: i64) -> Result<(), ServiceError> {
        match self.repo.get_category_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::CategoryNotFound),
        }
    }
}

#[async_trait]
impl ProductService for DefaultProductService {
    async fn create_product(&self, request: &ProductRequest) -> Result<(), ServiceError> {
        self.ensure_category(request.category_id).await?;
        self.repo.create_product(request).await?;
        Ok(())
    }

    async fn update_product(&self, id: i64, request: &ProductRequest) -> Result<(), ServiceError> {
        self.ensure_product(id).await?;
        self.ensure_category(request.category_id).await?;
        self.repo.update_product(id, request).await?;
        Ok(())
    }

    async fn delete_product(&self, id: i64) -> Result<(), ServiceError> {
        self.ensure_product(id).await?;
        self.repo.delete_product(id).await?;
        Ok(())
    }

    async fn get_product_by_id(&self, id: i64) -> Result<ProductResponse, ServiceError> {
        self.repo
            .get_product_by_id(id)
            .await?
            .map(ProductResponse::from)
            .ok_or(ServiceError::ProductNotFound)
    }

    async fn get_all_products(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        let products = self.repo.get_all_products().await?;
        Ok(products.into_iter().map(ProductResponse::from).collect())
    }

    fn api(&self) -> HealthCheck {
        HealthCheck::healthy("Products API")
    }
}
