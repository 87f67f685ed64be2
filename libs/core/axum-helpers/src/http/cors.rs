use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::CorsLayer;

/// Header carrying the acting user id set by the upstream auth layer
pub const ACTING_USER_HEADER: &str = "x-user-id";

/// Creates a CORS layer with common settings for API services.
///
/// # Returns
/// A configured `CorsLayer` with:
/// - The given allowed origins
/// - GET, POST, PUT, DELETE, PATCH, OPTIONS
/// - Content-Type, Authorization, Accept and the acting-user header
/// - Credentials allowed
/// - 1 hour max age
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
            HeaderName::from_static(ACTING_USER_HEADER),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Parse a comma separated origin list such as `CORS_ALLOWED_ORIGIN`.
/// Entries that are not valid header values are skipped with a warning.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}
