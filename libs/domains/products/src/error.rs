use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, errors::FieldError};
use thiserror::Error;

use crate::validation::FieldValidation;

pub const SIZE_UNIT_RULE_NOT_FOUND: &str = "size_unit_rule_not_found";
pub const PACKAGING_TYPE_RULE_NOT_FOUND: &str = "packaging_type_rule_not_found";
pub const PARENT_VARIANT_NOT_FOUND: &str = "parent_variant_not_found";
pub const SINGLE_PRODUCT_TYPE_REQUIRED: &str = "product_id must have single product type";
pub const INVALID_PRODUCT_TYPE_VARIANT: &str = "invalid product type variant";
pub const MISMATCHED_VARIANT_PRODUCT: &str = "mismatched variant product";
pub const CATEGORY_NOT_FOUND: &str = "category not found";
pub const RULE_NOT_FOUND: &str = "rule not found";
pub const RULE_ALREADY_EXISTS: &str = "rule already exists";

#[derive(Debug, Error)]
pub enum ProductError {
    /// One or more named fields failed validation. Always carries every failure found.
    #[error("Field validation failed on {} field(s)", .0.len())]
    FieldValidation(Vec<FieldValidation>),

    /// A cross-entity rule was violated (missing rule binding, wrong product type, ...).
    #[error("{0}")]
    BusinessRule(String),

    /// A referenced row does not exist or is inactive
    #[error("{0}")]
    NotFound(String),

    #[error("Acting user is required")]
    MissingActor,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    pub fn single_variant_count(count: usize) -> Self {
        ProductError::BusinessRule(format!("product_id must have exactly 1 variant : {}", count))
    }

    pub fn product_not_identified(variant_id: &str) -> Self {
        ProductError::BusinessRule(format!("product not identified : {}", variant_id))
    }

    pub(crate) fn database(err: impl std::fmt::Display) -> Self {
        ProductError::Internal(format!("Database error: {}", err))
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::FieldValidation(fields) => AppError::FieldValidation(
                fields
                    .into_iter()
                    .map(|f| FieldError::new(f.field, f.message))
                    .collect(),
            ),
            ProductError::BusinessRule(msg) => AppError::BadRequest(msg),
            ProductError::NotFound(msg) => AppError::NotFound(msg),
            ProductError::MissingActor => {
                AppError::Unauthorized("Acting user is required".to_string())
            }
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
