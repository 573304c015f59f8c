//! Domain models
//!
//! Row types implement [`kasir_db::FromColumns`]; request and response
//! types are the JSON shapes of the HTTP API.

pub mod category;
pub mod health;
pub mod product;
pub mod time;

pub use category::{Category, CategoryRequest, CategoryResponse};
pub use health::HealthCheck;
pub use product::{CategoryRef, ProductRequest, ProductResponse, ProductWithCategory};
