//! # Garage Migrator
//! One-time migration of an embedded store file into the PostgreSQL backend.
//!
//! The [`MigrationExecutor`] initializes the relational schema, then copies every
//! record kind in catalog order inside a single transaction, keeping each
//! record's original identity. Either everything is committed or nothing is.
pub mod errors;
pub mod executor;
pub mod report;
pub mod state;

pub use errors::MigrationError;
pub use executor::{MigrationExecutor, MIGRATION_LOCK_KEY};
pub use report::MigrationReport;
pub use state::MigrationState;

/// Message reported to callers for every failed migration.
pub const GENERIC_ERROR_MESSAGE: &str = "An error has occurred, try again later";
