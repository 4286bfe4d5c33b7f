/// Request extractors and deserialization helpers
///
/// [`ApiJson`] behaves like `axum::Json` but reports every body rejection
/// (bad syntax, missing field, wrong content type) as a 400 `ApiError`
/// instead of axum's plain-text 415/422 responses. [`ApiPath`] and
/// [`ApiQuery`] do the same for path segments and query strings.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};

/// JSON body extractor with API-shaped rejections
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    tracing::debug!(reason = %rejection.body_text(), "Rejected JSON body");
    ApiError::BadRequest(rejection.body_text())
}

/// Path extractor with API-shaped rejections
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ApiPath(value))
            .map_err(path_rejection_to_error)
    }
}

fn path_rejection_to_error(rejection: PathRejection) -> ApiError {
    tracing::debug!(reason = %rejection.body_text(), "Rejected path");
    ApiError::BadRequest(rejection.body_text())
}

/// Query string extractor with API-shaped rejections
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(query_rejection_to_error)
    }
}

fn query_rejection_to_error(rejection: QueryRejection) -> ApiError {
    tracing::debug!(reason = %rejection.body_text(), "Rejected query string");
    ApiError::BadRequest(rejection.body_text())
}

/// Deserializes a string and trims surrounding whitespace
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Optional variant of [`trimmed`]
pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|s| s.map(|s| s.trim().to_string()))
}

/// Distinguishes an explicit `null` from an absent field
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: absent gives
/// `None`, `null` gives `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
