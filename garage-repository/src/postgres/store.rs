use async_trait::async_trait;
use garage_shared::{Entity, EntityKind};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::info;

use crate::errors::RepositoryError;
use crate::interfaces::RecordSource;

use super::repository;
use super::{PostgresRepository, PostgresSchemaInitializer};

/// PostgreSQL-backed record store.
///
/// Owns the connection pool; per-type ports are handed out by [`PostgresStore::repository`].
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: sqlx::PgPool,
}

impl PostgresStore {
    /// Wraps an existing pool. The schema is assumed to exist.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Connects and creates any missing tables.
    ///
    /// # Arguments
    ///
    /// * `pool_options` - Pool sizing and timeouts
    /// * `connect_options` - PostgreSQL server and credentials
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresStore)` - Connected store with an initialized schema
    /// * `Err(RepositoryError)` - Connection or schema creation failed
    pub async fn connect_with(
        pool_options: PgPoolOptions,
        connect_options: PgConnectOptions,
    ) -> Result<Self, RepositoryError> {
        let pool = pool_options.connect_with(connect_options).await?;
        let store = Self::new(pool);
        store.schema().initialize().await?;
        info!("Connected to PostgreSQL record store");
        Ok(store)
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }

    pub fn repository<T: Entity>(&self) -> PostgresRepository<T> {
        PostgresRepository::new(self.pool.clone())
    }

    pub fn schema(&self) -> PostgresSchemaInitializer {
        PostgresSchemaInitializer::new(self.pool.clone())
    }

    /// Round-trips a trivial query to check the server is reachable.
    pub async fn ensure_reachable(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Inserts a stored document of `kind` at the key it carries.
    ///
    /// Key and typed columns are read from the document; document tables keep
    /// it whole, including fields the record types do not declare. Fails with
    /// `ConstraintViolation` when the key is already taken.
    pub async fn insert_document_tx(
        &self,
        kind: EntityKind,
        document: &Value,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), RepositoryError> {
        repository::insert_document_tx(kind.spec(), document, tx).await
    }

    /// Moves the identity sequence of `kind` past its largest stored id.
    pub async fn reset_identity_tx(
        &self,
        kind: EntityKind,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), RepositoryError> {
        repository::reset_identity_tx(kind.spec(), tx).await
    }
}

#[async_trait]
impl RecordSource for PostgresStore {
    async fn read_documents(&self, kind: EntityKind) -> Result<Vec<Value>, RepositoryError> {
        repository::fetch_documents(&self.pool, kind.spec()).await
    }
}
