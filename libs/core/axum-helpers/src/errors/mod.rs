pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// Returned for all error responses:
/// - `code`: Integer error code for logging/monitoring (e.g., 1013)
/// - `error`: Machine-readable error identifier (e.g., "INVALID_FIELD_VALIDATION")
/// - `message`: Human-readable error message
/// - `details`: Optional additional error details (e.g., field errors)
///
/// # JSON Example
///
/// ```json
/// {
///   "code": 1012,
///   "error": "BAD_REQUEST",
///   "message": "size_unit_rule_not_found",
///   "details": null
/// }
/// ```
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details (e.g., validation field errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// A failed check on a single named request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Field validation failed")]
    FieldValidation(Vec<FieldError>),

    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Flatten validator output into `[{field, message}]`, ordered by field name.
fn validation_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                FieldError::new(field.to_string(), message)
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

fn field_details(fields: &[FieldError]) -> Option<serde_json::Value> {
    Some(serde_json::to_value(fields).unwrap_or(serde_json::Value::Null))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details, code) = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::JsonExtraction.code(),
                    "JSON extraction error: {:?}",
                    e
                );
                (e.status(), e.body_text(), None, ErrorCode::JsonExtraction)
            }
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::InvalidFieldValidation.code(),
                    "Validation error: {:?}",
                    e
                );
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::InvalidFieldValidation
                        .default_message()
                        .to_string(),
                    field_details(&validation_field_errors(&e)),
                    ErrorCode::InvalidFieldValidation,
                )
            }
            AppError::FieldValidation(fields) => {
                tracing::info!(
                    error_code = ErrorCode::InvalidFieldValidation.code(),
                    fields = fields.len(),
                    "Field validation failed"
                );
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::InvalidFieldValidation
                        .default_message()
                        .to_string(),
                    field_details(&fields),
                    ErrorCode::InvalidFieldValidation,
                )
            }
            AppError::InvalidUuid(value) => {
                tracing::info!(
                    error_code = ErrorCode::InvalidUuid.code(),
                    "Invalid UUID: {}",
                    value
                );
                (
                    StatusCode::BAD_REQUEST,
                    format!("{}: {}", ErrorCode::InvalidUuid.default_message(), value),
                    None,
                    ErrorCode::InvalidUuid,
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = ErrorCode::BadRequest.code(), "Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg, None, ErrorCode::BadRequest)
            }
            AppError::Unauthorized(msg) => {
                tracing::info!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, msg, None, ErrorCode::Unauthorized)
            }
            AppError::NotFound(msg) => {
                tracing::info!(
                    error_code = ErrorCode::NotFound.code(),
                    "Not found: {}",
                    msg
                );
                (StatusCode::NOT_FOUND, msg, None, ErrorCode::NotFound)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError.default_message().to_string(),
                    None,
                    ErrorCode::InternalError,
                )
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    msg,
                    None,
                    ErrorCode::ServiceUnavailable,
                )
            }
            AppError::Database(e) => map_db_error(&e),
        };

        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Maps DbErr to HTTP response components. Pool exhaustion is retryable, the rest is not.
fn map_db_error(error: &DbErr) -> (StatusCode, String, Option<serde_json::Value>, ErrorCode) {
    match error {
        DbErr::ConnectionAcquire(e) => {
            tracing::warn!(
                error_code = ErrorCode::DatabasePoolTimeout.code(),
                "Database connection acquire failed: {:?}",
                e
            );
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::DatabasePoolTimeout.default_message().to_string(),
                None,
                ErrorCode::DatabasePoolTimeout,
            )
        }
        _ => {
            tracing::error!(
                error_code = ErrorCode::DatabaseError.code(),
                "Database error: {:?}",
                error
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError.default_message().to_string(),
                None,
                ErrorCode::DatabaseError,
            )
        }
    }
}

/// Helper function to create error responses.
///
/// # Example
///
/// ```rust,ignore
/// use axum_helpers::errors::{error_response, ErrorCode};
/// use axum::http::StatusCode;
///
/// let response = error_response(
///     StatusCode::NOT_FOUND,
///     "Route not found".to_string(),
///     ErrorCode::NotFound,
/// );
/// ```
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details: None,
    });

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use validator::ValidationError;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_field_validation_shape() {
        let response = AppError::FieldValidation(vec![
            FieldError::new("size_value", "size_value must be greater than 0"),
            FieldError::new("sell_price", "sell_price is required"),
        ])
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "INVALID_FIELD_VALIDATION");
        assert_eq!(body["code"], 1013);
        assert_eq!(body["details"][0]["field"], "size_value");
        assert_eq!(body["details"][1]["message"], "sell_price is required");
    }

    #[tokio::test]
    async fn test_validator_errors_use_field_list() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "status",
            ValidationError::new("allowed_words")
                .with_message("string must contain only allowed words".into()),
        );

        let response = AppError::from(errors).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "INVALID_FIELD_VALIDATION");
        assert_eq!(body["details"][0]["field"], "status");
        assert_eq!(
            body["details"][0]["message"],
            "string must contain only allowed words"
        );
    }

    #[tokio::test]
    async fn test_bad_request_keeps_message() {
        let response = AppError::BadRequest("parent_variant_not_found".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "BAD_REQUEST");
        assert_eq!(body["message"], "parent_variant_not_found");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response =
            AppError::InternalServerError("Database error: relation missing".to_string())
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn test_database_error_is_server_error() {
        let response = AppError::from(DbErr::Custom("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "DATABASE_ERROR");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let response = AppError::Unauthorized("Acting user is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "UNAUTHORIZED");
    }
}
