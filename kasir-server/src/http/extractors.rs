//! Custom Axum extractors

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use super::envelope::Resource;
use super::error::ApiError;

async fn path_id<S>(parts: &mut Parts, state: &S, resource: Resource) -> Result<i64, ApiError>
where
    S: Send + Sync,
{
    let Path(raw): Path<String> = Path::from_request_parts(parts, state)
        .await
        .map_err(|e| ApiError::InvalidId {
            resource,
            reason: e.body_text(),
        })?;

    raw.parse().map_err(|e: std::num::ParseIntError| ApiError::InvalidId {
        resource,
        reason: e.to_string(),
    })
}

/// Category id from the `{id}` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryId(pub i64);

impl<S> FromRequestParts<S> for CategoryId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        path_id(parts, state, Resource::Category).await.map(Self)
    }
}

/// Product id from the `{id}` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductId(pub i64);

impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        path_id(parts, state, Resource::Product).await.map(Self)
    }
}

/// Turn a JSON body rejection into a 400 for `resource`
pub fn invalid_body(resource: Resource) -> impl FnOnce(JsonRejection) -> ApiError {
    move |rejection| ApiError::InvalidRequest {
        resource,
        reason: rejection.body_text(),
    }
}
