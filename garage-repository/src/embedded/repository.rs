use std::marker::PhantomData;

use async_trait::async_trait;
use garage_shared::{Entity, OwnedEntity, RecordId, Token, UserAccess, UserData};

use crate::document::{self, from_document, FieldValue};
use crate::errors::RepositoryError;
use crate::interfaces::{
    OwnedRecordRepository, RecordRepository, TokenRecordRepository, UserAccessRepository,
    UserRecordRepository,
};

use super::EmbeddedStore;

/// Embedded storage port for records of type `T`.
pub struct EmbeddedRepository<T> {
    store: EmbeddedStore,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> EmbeddedRepository<T> {
    pub fn new(store: EmbeddedStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    async fn find_where(&self, field: &str, value: FieldValue<'_>) -> Result<Vec<T>, RepositoryError> {
        self.store
            .find_where(T::KIND.spec(), field, value)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }
}

#[async_trait]
impl<T: Entity> RecordRepository<T> for EmbeddedRepository<T> {
    async fn list(&self) -> Result<Vec<T>, RepositoryError> {
        self.store
            .find_all(T::KIND.spec())
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    async fn get(&self, key: T::Key) -> Result<Option<T>, RepositoryError> {
        self.store
            .find_by_key(T::KIND.spec(), key.into())
            .await?
            .map(from_document)
            .transpose()
    }

    async fn save(&self, record: T) -> Result<T, RepositoryError> {
        let key = document::storage_key(&record);
        let stored = self
            .store
            .upsert(T::KIND.spec(), key, document::to_document(&record)?)
            .await?;
        from_document(stored)
    }

    async fn delete(&self, key: T::Key) -> Result<bool, RepositoryError> {
        self.store.remove(T::KIND.spec(), key.into()).await
    }
}

#[async_trait]
impl<T: OwnedEntity> OwnedRecordRepository<T> for EmbeddedRepository<T> {
    async fn list_by_vehicle(&self, vehicle_id: RecordId) -> Result<Vec<T>, RepositoryError> {
        self.find_where("VehicleId", FieldValue::Int(vehicle_id)).await
    }
}

#[async_trait]
impl UserRecordRepository for EmbeddedRepository<UserData> {
    async fn get_by_username(&self, user_name: &str) -> Result<Option<UserData>, RepositoryError> {
        let users = self.find_where("UserName", FieldValue::Text(user_name)).await?;
        Ok(users.into_iter().next())
    }

    async fn get_by_email(&self, email_address: &str) -> Result<Option<UserData>, RepositoryError> {
        let users = self
            .find_where("EmailAddress", FieldValue::Text(email_address))
            .await?;
        Ok(users.into_iter().next())
    }
}

#[async_trait]
impl TokenRecordRepository for EmbeddedRepository<Token> {
    async fn get_by_body(&self, body: &str) -> Result<Option<Token>, RepositoryError> {
        let tokens = self.find_where("Body", FieldValue::Text(body)).await?;
        Ok(tokens.into_iter().next())
    }

    async fn get_by_email(&self, email_address: &str) -> Result<Vec<Token>, RepositoryError> {
        self.find_where("EmailAddress", FieldValue::Text(email_address))
            .await
    }
}

#[async_trait]
impl UserAccessRepository for EmbeddedRepository<UserAccess> {
    async fn list_by_user(&self, user_id: RecordId) -> Result<Vec<UserAccess>, RepositoryError> {
        self.find_where("UserId", FieldValue::Int(user_id)).await
    }
}
