//! PostgreSQL backend.
//!
//! Records live in the `app` schema, one table per record kind. Most tables keep
//! the serialized record in a `data jsonb` column next to its key columns; user
//! and token tables use typed columns instead.
mod repository;
mod schema;
mod store;

pub use repository::PostgresRepository;
pub use schema::PostgresSchemaInitializer;
pub use store::PostgresStore;
