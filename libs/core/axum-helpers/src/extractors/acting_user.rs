//! Identity of the user performing a mutation.

use crate::errors::AppError;
use crate::http::ACTING_USER_HEADER;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Opaque identifier of the acting user, stamped into `created_by` / `updated_by`.
///
/// Resolved from request extensions first (an upstream auth layer may insert
/// one), then from the `x-user-id` header. Missing or blank yields `401`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser(pub String);

impl ActingUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<ActingUser>() {
            if !user.0.trim().is_empty() {
                return Ok(user.clone());
            }
        }

        parts
            .headers
            .get(ACTING_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| ActingUser(v.to_string()))
            .ok_or_else(|| AppError::Unauthorized("Acting user is required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<ActingUser, AppError> {
        let (mut parts, _) = request.into_parts();
        ActingUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_from_header() {
        let request = Request::builder()
            .header(ACTING_USER_HEADER, " user-42 ")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap().id(), "user-42");
    }

    #[tokio::test]
    async fn test_from_extensions() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ActingUser("svc-importer".to_string()));
        assert_eq!(extract(request).await.unwrap().id(), "svc-importer");
    }

    #[tokio::test]
    async fn test_missing_or_blank_is_unauthorized() {
        let missing = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(missing).await,
            Err(AppError::Unauthorized(_))
        ));

        let blank = Request::builder()
            .header(ACTING_USER_HEADER, "   ")
            .body(())
            .unwrap();
        assert!(matches!(extract(blank).await, Err(AppError::Unauthorized(_))));
    }
}
