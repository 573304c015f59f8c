//! Health check endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::http::envelope::ApiResponse;
use crate::http::error::ApiError;
use crate::models::HealthCheck;
use crate::services::health::DATABASE_NAME;
use crate::state::AppState;

/// 200 with `<name> is healthy`, otherwise 503
pub(crate) fn report(check: HealthCheck) -> Result<Json<ApiResponse<()>>, ApiError> {
    if check.is_healthy {
        Ok(Json(ApiResponse::success(format!("{} is healthy", check.name))))
    } else {
        Err(ApiError::Unhealthy {
            message: format!("{} is not healthy", check.name),
        })
    }
}

/// GET /health/service
async fn service_health(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<()>>, ApiError> {
    report(state.health.api())
}

/// GET /health/db
async fn db_health(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<()>>, ApiError> {
    match state.health.db().await {
        Ok(check) => report(check),
        Err(e) => Err(ApiError::Unhealthy {
            message: format!("{} is not healthy because {}", DATABASE_NAME, e),
        }),
    }
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health/service", get(service_health))
        .route("/health/db", get(db_health))
}
