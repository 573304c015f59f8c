//! Repositories
//!
//! Each repository is a trait (the seam services are tested against) plus
//! an implementation over [`kasir_db::Db`]. Writes run inside a
//! transaction; reads use a scoped statement.

pub mod categories;
pub mod health;
pub mod products;

pub use categories::{CategoryRepository, DbCategoryRepository};
pub use health::{DbHealthRepository, HealthRepository};
pub use products::{DbProductRepository, ProductRepository};
