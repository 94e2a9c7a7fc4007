//! Idempotent creation of the relational schema.

use garage_shared::{EntityKind, SCHEMA};
use sqlx::Row;
use tracing::{debug, info};

use crate::errors::SchemaError;

/// Creates the `app` schema and one table per record kind.
///
/// Every statement is `IF NOT EXISTS`, so initialization is safe to run on each
/// startup and before each migration.
pub struct PostgresSchemaInitializer {
    pool: sqlx::PgPool,
}

impl PostgresSchemaInitializer {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn initialize(&self) -> Result<(), SchemaError> {
        let mut tx = self.pool.begin().await?;
        self.initialize_tx(&mut tx).await?;
        tx.commit().await?;
        info!(tables = EntityKind::ALL.len(), "Relational schema ready");
        Ok(())
    }

    pub async fn initialize_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), SchemaError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", SCHEMA))
            .execute(&mut **tx)
            .await
            .map_err(|source| SchemaError::CreateSchema { schema: SCHEMA, source })?;

        for kind in EntityKind::ALL {
            let spec = kind.spec();
            sqlx::query(&spec.create_table_sql())
                .execute(&mut **tx)
                .await
                .map_err(|source| SchemaError::CreateTable { table: spec.table, source })?;
            debug!(table = spec.table, "Ensured table");
        }
        Ok(())
    }

    /// Names of the tables currently present in the `app` schema, sorted.
    pub async fn list_tables(&self) -> Result<Vec<String>, SchemaError> {
        let rows = sqlx::query(
            "SELECT table_name::text AS table_name FROM information_schema.tables WHERE table_schema = $1 ORDER BY table_name",
        )
        .bind(SCHEMA)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("table_name").map_err(SchemaError::from))
            .collect()
    }
}
