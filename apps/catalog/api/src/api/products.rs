//! Products API routes

use axum::Router;
use domain_products::{PgProductStore, ProductService, handlers};

use crate::state::AppState;

/// Create the catalog router over the shared connection pool
pub fn router(state: &AppState) -> Router {
    let store = PgProductStore::new(state.db.clone());
    let service = ProductService::new(store);
    handlers::router(service)
}
