//! Business rules between the HTTP layer and the repositories
//!
//! Services check that referenced rows exist before writing and convert
//! rows into response shapes.

pub mod categories;
pub mod health;
pub mod products;

use kasir_db::DbError;

pub use categories::{CategoryService, DefaultCategoryService};
pub use health::{DefaultHealthService, HealthService};
pub use products::{DefaultProductService, ProductService};

/// Service error
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("category not found")]
    CategoryNotFound,

    #[error("product not found")]
    ProductNotFound,

    #[error(transparent)]
    Repository(#[from] DbError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CategoryNotFound | Self::ProductNotFound)
    }
}
