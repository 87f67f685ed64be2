//! API routes module

pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Versioned API routes. `create_router` mounts them under `/api`.
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/v1", products::router(state))
}

/// Readiness endpoint backed by a database ping
pub fn ready_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
