//! Products Domain
//!
//! Product catalog write paths (create, single update, variant update) and the
//! category rules that gate them, backed by PostgreSQL.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, acting user, audit events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Field validation, category rules, unit-of-work orchestration
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← ProductStore / ProductUnitOfWork traits + Postgres and in-memory stores
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Requests, persistence payloads, rule listings
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{PgProductStore, ProductService, handlers};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgresql://localhost/catalog").await?;
//!
//! let service = ProductService::new(PgProductStore::new(db));
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod category_rules;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod rules;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    CreatePackagingRuleRequest, CreateProductRequest, CreateSizeUnitRuleRequest, PackagingRule,
    PackagingRuleList, ProductType, RuleListQuery, RuleStatus, SizeUnitRule, SizeUnitRuleList,
    UpdatePackagingRuleRequest, UpdateRuleStatusRequest, UpdateSingleProductTypeRequest,
    UpdateSizeUnitRuleRequest, UpdateVariantProductTypeRequest, VariantInput,
};
pub use postgres::PgProductStore;
pub use repository::{InMemoryProductStore, ProductStore, ProductUnitOfWork};
pub use service::ProductService;
