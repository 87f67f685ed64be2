//! Query string extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Query extractor with automatic validation.
///
/// Deserialization failures map to `400 BAD_REQUEST`; `Validate` failures
/// map to `400 INVALID_FIELD_VALIDATION` with one entry per field.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::ValidatedQuery;
///
/// async fn list_rules(ValidatedQuery(query): ValidatedQuery<RuleListQuery>) -> String {
///     format!("{:?}", query.status)
/// }
/// ```
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(data) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        data.validate()?;

        Ok(ValidatedQuery(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Filter {
        #[validate(length(max = 5, message = "status is too long"))]
        status: Option<String>,
    }

    async fn handler(ValidatedQuery(filter): ValidatedQuery<Filter>) -> String {
        filter.status.unwrap_or_default()
    }

    async fn status_for(uri: &str) -> StatusCode {
        Router::new()
            .route("/rules", get(handler))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_valid_query_passes() {
        assert_eq!(status_for("/rules?status=TRUE").await, StatusCode::OK);
        assert_eq!(status_for("/rules").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_query_is_rejected() {
        assert_eq!(
            status_for("/rules?status=SOMETHING").await,
            StatusCode::BAD_REQUEST
        );
    }
}
