//! HTTP server layer
//!
//! Axum server with:
//! - Envelope responses (`code`, `message`, `data`)
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown

pub mod envelope;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use envelope::{ApiResponse, ERROR_CODE, SUCCESS_CODE};
pub use error::ApiError;
pub use server::{build_router, run_server, ServerConfig, ServerError};
