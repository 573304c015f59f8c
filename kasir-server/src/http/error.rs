//! API error type with IntoResponse
//!
//! Errors become envelope responses with code `2000` and a status that
//! matches the failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::envelope::{Action, ApiResponse, Resource};
use crate::services::ServiceError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Path id is not an integer (400)
    InvalidId { resource: Resource, reason: String },

    /// Body missing or not a valid request (400)
    InvalidRequest { resource: Resource, reason: String },

    /// Service call failed (404 when something was missing, else 500)
    Service {
        resource: Resource,
        action: Action,
        source: ServiceError,
    },

    /// Health probe failed (503)
    Unhealthy { message: String },
}

impl ApiError {
    pub fn service(resource: Resource, action: Action) -> impl FnOnce(ServiceError) -> Self {
        move |source| Self::Service {
            resource,
            action,
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId { .. } | Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Service { source, .. } if source.is_not_found() => StatusCode::NOT_FOUND,
            Self::Service { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unhealthy { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidId { resource, reason } => {
                format!("invalid {} id: {}", resource.noun(), reason)
            }
            Self::InvalidRequest { resource, reason } => {
                format!("invalid {} request: {}", resource.noun(), reason)
            }
            Self::Service {
                resource,
                action,
                source,
            } => format!("{}: {}", action.failed(*resource), source),
            Self::Unhealthy { message } => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{}", message);
        } else if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::warn!("{}", message);
        }

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use kasir_db::DbError;

    async fn body(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_id_is_400() {
        let (status, body) = body(ApiError::InvalidId {
            resource: Resource::Product,
            reason: "invalid digit found in string".into(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "2000");
        assert_eq!(body["message"], "invalid product id: invalid digit found in string");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let err = ApiError::service(Resource::Category, Action::Get)(ServiceError::CategoryNotFound);
        let (status, body) = body(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Category retrieved failed: category not found");
    }

    #[tokio::test]
    async fn repository_failure_is_500() {
        let err = ApiError::service(Resource::Product, Action::Create)(ServiceError::Repository(
            DbError::driver("boom"),
        ));
        let (status, body) = body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Product created failed: boom");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn unhealthy_is_503() {
        let err = ApiError::Unhealthy {
            message: "Products API is not healthy".into(),
        };
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
