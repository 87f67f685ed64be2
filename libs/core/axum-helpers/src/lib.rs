//! # Axum Helpers
//!
//! Shared plumbing for the catalog HTTP services.
//!
//! ## Modules
//!
//! - **[`server`]**: Router setup, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (CORS, security headers)
//! - **[`errors`]**: Structured error responses with error codes
//! - **[`extractors`]**: Custom extractors (UUID path, validated query, acting user)
//! - **[`audit`]**: Audit logging for catalog mutations
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router};
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let api_routes = Router::new(); // Add your routes
//!     let router = create_router::<ApiDoc>(api_routes).await?;
//!
//!     create_production_app(router, &config.server, Duration::from_secs(30), async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

// Re-export server types
pub use server::{
    CleanupCoordinator, HealthCheckFuture, HealthResponse, ShutdownCoordinator, close_postgres,
    create_production_app, create_router, health_router, run_health_checks, shutdown_signal,
};

// Re-export HTTP middleware
pub use http::{ACTING_USER_HEADER, create_cors_layer, parse_allowed_origins, security_headers};

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse, FieldError};

// Re-export extractors
pub use extractors::{ActingUser, UuidPath, ValidatedQuery};

// Re-export audit types
pub use audit::{
    AuditEvent, AuditOutcome, extract_ip_from_headers, extract_ip_from_socket, extract_user_agent,
};
