//! # Garage Repository
//! This crate provides the storage port for the garage records and its two
//! implementations: an embedded single-file SQLite store and a PostgreSQL store
//! that keeps each record as a JSON document next to its key columns. It also
//! owns the schema initializer for the PostgreSQL backend.
pub mod document;
pub mod embedded;
pub mod errors;
pub mod interfaces;
pub mod postgres;

pub use embedded::{EmbeddedRepository, EmbeddedStore};
pub use errors::{RepositoryError, SchemaError};
pub use interfaces::{
    OwnedRecordRepository, RecordRepository, RecordSource, TokenRecordRepository,
    UserAccessRepository, UserRecordRepository,
};
pub use postgres::{PostgresRepository, PostgresSchemaInitializer, PostgresStore};
