//! Custom extractors for Axum handlers.
//!
//! This module provides reusable extractors that reduce boilerplate
//! and standardize error handling across your API.

pub mod acting_user;
pub mod uuid_path;
pub mod validated_query;

pub use acting_user::ActingUser;
pub use uuid_path::UuidPath;
pub use validated_query::ValidatedQuery;
