use async_trait::async_trait;
use garage_shared::{Entity, OwnedEntity, RecordId, Token, UserAccess, UserData};

use crate::errors::RepositoryError;

/// Storage port for one record type.
///
/// Implementations must behave the same regardless of backend so that callers
/// can be pointed at either store without noticing.
#[async_trait]
pub trait RecordRepository<T: Entity>: Send + Sync {
    /// Returns every stored record, in no particular order.
    async fn list(&self) -> Result<Vec<T>, RepositoryError>;

    async fn get(&self, key: T::Key) -> Result<Option<T>, RepositoryError>;

    /// Persists a record and returns it as stored.
    ///
    /// A record whose id is unset (`0`) gets a new identity from the backend,
    /// which is written into the returned record. Any other key updates the
    /// stored record in place, or inserts it at that key if absent.
    async fn save(&self, record: T) -> Result<T, RepositoryError>;

    /// Returns `true` iff a record was removed.
    async fn delete(&self, key: T::Key) -> Result<bool, RepositoryError>;
}

/// Storage port for records scoped to a vehicle.
#[async_trait]
pub trait OwnedRecordRepository<T: OwnedEntity>: RecordRepository<T> {
    async fn list_by_vehicle(&self, vehicle_id: RecordId) -> Result<Vec<T>, RepositoryError>;
}

/// Account lookups backed by the typed user columns.
#[async_trait]
pub trait UserRecordRepository: RecordRepository<UserData> {
    async fn get_by_username(&self, user_name: &str) -> Result<Option<UserData>, RepositoryError>;
    async fn get_by_email(&self, email_address: &str) -> Result<Option<UserData>, RepositoryError>;
}

#[async_trait]
pub trait TokenRecordRepository: RecordRepository<Token> {
    async fn get_by_body(&self, body: &str) -> Result<Option<Token>, RepositoryError>;
    async fn get_by_email(&self, email_address: &str) -> Result<Vec<Token>, RepositoryError>;
}

#[async_trait]
pub trait UserAccessRepository: OwnedRecordRepository<UserAccess> {
    async fn list_by_user(&self, user_id: RecordId) -> Result<Vec<UserAccess>, RepositoryError>;
}
