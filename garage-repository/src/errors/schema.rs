use thiserror::Error;

/// Errors raised while creating the relational schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to create schema {schema}: {source}")]
    CreateSchema {
        schema: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to create table {table}: {source}")]
    CreateTable {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}
