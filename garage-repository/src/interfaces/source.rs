use async_trait::async_trait;
use garage_shared::{Entity, EntityKind};
use serde_json::Value;

use crate::document;
use crate::errors::RepositoryError;

/// Bulk read access to every record of a kind.
///
/// The migration copies the raw documents so fields unknown to the record
/// types survive the move. Tests use the typed form to read the target back.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Every stored document of `kind`, as persisted.
    async fn read_documents(&self, kind: EntityKind) -> Result<Vec<Value>, RepositoryError>;

    async fn read_all<T: Entity>(&self) -> Result<Vec<T>, RepositoryError> {
        self.read_documents(T::KIND)
            .await?
            .into_iter()
            .map(document::from_document)
            .collect()
    }
}
