//! Category endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::health::report;
use crate::http::envelope::{Action, ApiResponse, Resource};
use crate::http::error::ApiError;
use crate::http::extractors::{invalid_body, CategoryId};
use crate::models::{CategoryRequest, CategoryResponse};
use crate::state::AppState;

const RESOURCE: Resource = Resource::Category;

/// GET /categories/health
async fn api_health(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<()>>, ApiError> {
    report(state.categories.api())
}

/// GET /categories
async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, ApiError> {
    let categories = state
        .categories
        .get_all_categories()
        .await
        .map_err(ApiError::service(RESOURCE, Action::List))?;

    Ok(Json(
        ApiResponse::success(Action::List.succeeded(RESOURCE)).with_data(categories),
    ))
}

/// POST /categories
async fn create_category(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), ApiError> {
    let Json(request) = payload.map_err(invalid_body(RESOURCE))?;
    state
        .categories
        .create_category(&request)
        .await
        .map_err(ApiError::service(RESOURCE, Action::Create))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Action::Create.succeeded(RESOURCE))),
    ))
}

/// GET /categories/{id}
async fn get_category(
    CategoryId(id): CategoryId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CategoryResponse>>, ApiError> {
    let category = state
        .categories
        .get_category_by_id(id)
        .await
        .map_err(ApiError::service(RESOURCE, Action::Get))?;

    Ok(Json(
        ApiResponse::success(Action::Get.succeeded(RESOURCE)).with_data(category),
    ))
}

/// PUT /categories/{id}
async fn update_category(
    CategoryId(id): CategoryId,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Json(request) = payload.map_err(invalid_body(RESOURCE))?;
    state
        .categories
        .update_category(id, &request)
        .await
        .map_err(ApiError::service(RESOURCE, Action::Update))?;

    Ok(Json(ApiResponse::success(Action::Update.succeeded(RESOURCE))))
}

/// DELETE /categories/{id}
async fn delete_category(
    CategoryId(id): CategoryId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .categories
        .delete_category(id)
        .await
        .map_err(ApiError::service(RESOURCE, Action::Delete))?;

    Ok(Json(ApiResponse::success(Action::Delete.succeeded(RESOURCE))))
}

/// Category routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/health", get(api_health))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}
