//! kasir-server: REST API for a point of sale
//!
//! CRUD over products and categories plus health checks, served by axum
//! on top of [`kasir_db`]. Layers, outermost first:
//!
//! - [`http`]: routes, envelope responses, error mapping
//! - [`services`]: existence checks and response shaping
//! - [`repos`]: SQL over [`kasir_db::Db`]
//! - [`models`]: rows, requests and responses

pub mod config;
pub mod http;
pub mod models;
pub mod repos;
pub mod services;
pub mod state;

pub use config::{Config, ConfigError, DatabaseConfig};
pub use http::{build_router, run_server, ApiError, ServerConfig, ServerError};
pub use state::AppState;
