//! Application state shared across handlers

use std::sync::Arc;

use kasir_db::Db;

use crate::repos::{DbCategoryRepository, DbHealthRepository, DbProductRepository};
use crate::services::{
    CategoryService, DefaultCategoryService, DefaultHealthService, DefaultProductService,
    HealthService, ProductService,
};

/// Services behind the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<dyn CategoryService>,
    pub products: Arc<dyn ProductService>,
    pub health: Arc<dyn HealthService>,
}

impl AppState {
    /// Wire repositories and services over one database handle
    pub fn from_db(db: Db) -> Self {
        let categories = DefaultCategoryService::new(Arc::new(DbCategoryRepository::new(db.clone())));
        let products = DefaultProductService::new(Arc::new(DbProductRepository::new(db.clone())));
        let health = DefaultHealthService::new(Arc::new(DbHealthRepository::new(db)));

        Self {
            categories: Arc::new(categories),
            products: Arc::new(products),
            health: Arc::new(health),
        }
    }
}
