//! Error types for the migration.
use garage_repository::{RepositoryError, SchemaError};
use garage_shared::EntityKind;
use thiserror::Error;

use crate::GENERIC_ERROR_MESSAGE;

/// Represents the ways a migration can fail.
///
/// The variants carry full detail for logs. Callers outside the process only
/// ever see [`MigrationError::public_message`].
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Relational backend not available: {0}")]
    Unauthorized(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[source] RepositoryError),

    #[error("Schema initialization failed: {0}")]
    SchemaInitFailed(#[from] SchemaError),

    #[error("Copy failed for {kind}: {source}")]
    CopyFailed {
        kind: EntityKind,
        #[source]
        source: RepositoryError,
    },

    #[error("Another migration is already running")]
    MigrationInProgress,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] RepositoryError),
}

impl MigrationError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub fn copy_failed(kind: EntityKind, source: RepositoryError) -> Self {
        Self::CopyFailed { kind, source }
    }

    pub fn storage(source: impl Into<RepositoryError>) -> Self {
        Self::StorageUnavailable(source.into())
    }

    /// The only failure text that leaves the process.
    pub fn public_message(&self) -> &'static str {
        GENERIC_ERROR_MESSAGE
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_message_hides_detail() {
        let error = MigrationError::copy_failed(
            EntityKind::ServiceRecord,
            RepositoryError::ConstraintViolation("duplicate key value violates unique constraint \"servicerecords_pkey\"".to_string()),
        );
        assert!(error.to_string().contains("servicerecords_pkey"));
        assert_eq!(error.public_message(), GENERIC_ERROR_MESSAGE);
        assert!(!error.public_message().contains("servicerecords"));
    }

    #[test]
    fn test_unauthorized() {
        assert!(MigrationError::unauthorized("not configured").is_unauthorized());
        assert!(!MigrationError::MigrationInProgress.is_unauthorized());
    }
}
