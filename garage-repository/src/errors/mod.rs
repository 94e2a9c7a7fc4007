//! Error types for the garage repository.
//! Consolidates and re-exports the storage and schema error types.
mod repository;
mod schema;

pub use repository::RepositoryError;
pub use schema::SchemaError;
