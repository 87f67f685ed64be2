//! HTTP middleware module.
//!
//! This module provides HTTP-level middleware for:
//! - CORS configuration
//! - Security headers
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{create_cors_layer, parse_allowed_origins, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(create_cors_layer(parse_allowed_origins(&origins)));
//! ```

pub mod cors;
pub mod security;

pub use cors::{ACTING_USER_HEADER, create_cors_layer, parse_allowed_origins};
pub use security::security_headers;
