//! Product endpoints

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
use crate::http::extractors::{invalid_body, ProductId};
use crate::models::{ProductRequest, ProductResponse};
use crate::state::AppState;

const RESOURCE: Resource = Resource::Product;

/// GET /products/health
async fn api_health(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<()>>, ApiError> {
    report(state.products.api())
}

/// GET /products
async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ApiError> {
    let products = state
        .products
        .get_all_products()
        .await
        .map_err(ApiError::service(RESOURCE, Action::List))?;

    Ok(Json(
        ApiResponse::success(Action::List.succeeded(RESOURCE)).with_data(products),
    ))
}

/// POST /products - the referenced category must exist
async fn create_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), ApiError> {
    let Json(request) = payload.map_err(invalid_body(RESOURCE))?;
    state
        .products
        .create_product(&request)
        .await
        .map_err(ApiError::service(RESOURCE, Action::Create))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Action::Create.succeeded(RESOURCE))),
    ))
}

/// GET /products/{id}
async fn get_product(
    ProductId(id): ProductId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    let product = state
        .products
        .get_product_by_id(id)
        .await
        .map_err(ApiError::service(RESOURCE, Action::Get))?;

    Ok(Json(
        ApiResponse::success(Action::Get.succeeded(RESOURCE)).with_data(product),
    ))
}

/// PUT /products/{id}
async fn update_product(
    ProductId(id): ProductId,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Json(request) = payload.map_err(invalid_body(RESOURCE))?;
    state
        .products
        .update_product(id, &request)
        .await
        .map_err(ApiError::service(RESOURCE, Action::Update))?;

    Ok(Json(ApiResponse::success(Action::Update.succeeded(RESOURCE))))
}

/// DELETE /products/{id}
async fn delete_product(
    ProductId(id): ProductId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .products
        .delete_product(id)
        .await
        .map_err(ApiError::service(RESOURCE, Action::Delete))?;

    Ok(Json(ApiResponse::success(Action::Delete.succeeded(RESOURCE))))
}

/// Product routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/health", get(api_health))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}
