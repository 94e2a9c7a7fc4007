use std::path::{Path, PathBuf};

use async_trait::async_trait;
use garage_shared::{Entity, EntityKind, KeyShape, RecordId, RecordKey, TableSpec};
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Row, Sqlite};
use tracing::{debug, info};

use crate::document::{self, FieldValue};
use crate::errors::RepositoryError;
use crate::interfaces::RecordSource;

use super::EmbeddedRepository;

/// Handle to an embedded store file.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct EmbeddedStore {
    pool: SqlitePool,
    path: PathBuf,
    read_only: bool,
}

impl EmbeddedStore {
    /// Opens the store for reading and writing, creating the file if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| {
                RepositoryError::source_unavailable(format!("{}: {}", path.display(), e))
            })?;

        info!(path = %path.display(), "Opened embedded store");
        Ok(Self { pool, path, read_only: false })
    }

    /// Opens an existing store without write access.
    ///
    /// Writes through a read-only store fail with [`RepositoryError::ReadOnly`].
    ///
    /// # Returns
    ///
    /// * `Err(RepositoryError::SourceUnavailable)` - the file is missing or cannot be opened
    pub async fn open_read_only(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(RepositoryError::source_unavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }
        let options = SqliteConnectOptions::new().filename(&path).read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                RepositoryError::source_unavailable(format!("{}: {}", path.display(), e))
            })?;

        // Opening is lazy about the header; touch the catalog so a corrupt or
        // non-database file is rejected here rather than mid-read.
        sqlx::query("SELECT count(*) FROM sqlite_master")
            .fetch_one(&pool)
            .await
            .map_err(|e| {
                RepositoryError::source_unavailable(format!("{}: {}", path.display(), e))
            })?;

        info!(path = %path.display(), "Opened embedded store read-only");
        Ok(Self { pool, path, read_only: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns the storage port for records of type `T`.
    pub fn repository<T: Entity>(&self) -> EmbeddedRepository<T> {
        EmbeddedRepository::new(self.clone())
    }

    /// Releases the file. Other clones of this handle become unusable.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!(path = %self.path.display(), "Closed embedded store");
    }

    pub(crate) async fn collection_exists(&self, spec: &TableSpec) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT count(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(spec.table)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("n")?;
        Ok(count > 0)
    }

    async fn ensure_collection(&self, spec: &TableSpec) -> Result<(), RepositoryError> {
        if self.read_only {
            return Err(RepositoryError::ReadOnly);
        }
        let sql = match spec.key_shape {
            KeyShape::Composite => format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (key TEXT PRIMARY KEY, doc TEXT NOT NULL)",
                spec.table
            ),
            KeyShape::Standalone | KeyShape::Owned => format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (id INTEGER PRIMARY KEY AUTOINCREMENT, doc TEXT NOT NULL)",
                spec.table
            ),
        };
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Every document in the collection, oldest first.
    pub(crate) async fn find_all(&self, spec: &TableSpec) -> Result<Vec<Value>, RepositoryError> {
        if !self.collection_exists(spec).await? {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM \"{}\" ORDER BY rowid", select_list(spec), spec.table);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|row| decode_row(spec, row)).collect()
    }

    pub(crate) async fn find_by_key(
        &self,
        spec: &TableSpec,
        key: RecordKey,
    ) -> Result<Option<Value>, RepositoryError> {
        if !self.collection_exists(spec).await? {
            return Ok(None);
        }
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE {} = ?",
            select_list(spec),
            spec.table,
            key_column(spec)
        );
        let row = bind_key(sqlx::query(&sql), key)?
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| decode_row(spec, &row)).transpose()
    }

    /// Documents whose `field` equals `value`.
    pub(crate) async fn find_where(
        &self,
        spec: &TableSpec,
        field: &str,
        value: FieldValue<'_>,
    ) -> Result<Vec<Value>, RepositoryError> {
        if !self.collection_exists(spec).await? {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE json_extract(doc, ?) = ? ORDER BY rowid",
            select_list(spec),
            spec.table
        );
        let query = sqlx::query(&sql).bind(format!("$.{}", field));
        let query = match value {
            FieldValue::Int(v) => query.bind(v),
            FieldValue::Text(v) => query.bind(v.to_string()),
        };
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(|row| decode_row(spec, row)).collect()
    }

    /// Inserts or replaces a document. `key` is `None` when the record has no
    /// identity yet; the generated id is written into the returned document.
    pub(crate) async fn upsert(
        &self,
        spec: &TableSpec,
        key: Option<RecordKey>,
        mut document: Value,
    ) -> Result<Value, RepositoryError> {
        self.ensure_collection(spec).await?;

        let Some(key) = key else {
            let mut tx = self.pool.begin().await?;
            let sql = format!("INSERT INTO \"{}\" (doc) VALUES ('{{}}') RETURNING id", spec.table);
            let id: i64 = sqlx::query(&sql).fetch_one(&mut *tx).await?.try_get("id")?;
            let id = RecordId::try_from(id).map_err(|_| {
                RepositoryError::ConstraintViolation(format!("identity {} out of range", id))
            })?;
            document::stamp_id(&mut document, id)?;

            let sql = format!("UPDATE \"{}\" SET doc = ? WHERE id = ?", spec.table);
            sqlx::query(&sql)
                .bind(serde_json::to_string(&document)?)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            debug!(collection = spec.table, id, "Inserted document");
            return Ok(document);
        };

        let sql = format!(
            "INSERT INTO \"{table}\" ({key}, doc) VALUES (?, ?) ON CONFLICT({key}) DO UPDATE SET doc = excluded.doc",
            table = spec.table,
            key = key_column(spec)
        );
        bind_key(sqlx::query(&sql), key)?
            .bind(serde_json::to_string(&document)?)
            .execute(&self.pool)
            .await?;
        debug!(collection = spec.table, %key, "Upserted document");
        Ok(document)
    }

    pub(crate) async fn remove(&self, spec: &TableSpec, key: RecordKey) -> Result<bool, RepositoryError> {
        if self.read_only {
            return Err(RepositoryError::ReadOnly);
        }
        if !self.collection_exists(spec).await? {
            return Ok(false);
        }
        let sql = format!("DELETE FROM \"{}\" WHERE {} = ?", spec.table, key_column(spec));
        let result = bind_key(sqlx::query(&sql), key)?
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecordSource for EmbeddedStore {
    async fn read_documents(&self, kind: EntityKind) -> Result<Vec<Value>, RepositoryError> {
        self.find_all(kind.spec()).await
    }
}

fn key_column(spec: &TableSpec) -> &'static str {
    match spec.key_shape {
        KeyShape::Composite => "key",
        KeyShape::Standalone | KeyShape::Owned => "id",
    }
}

fn select_list(spec: &TableSpec) -> &'static str {
    match spec.key_shape {
        KeyShape::Composite => "doc",
        KeyShape::Standalone | KeyShape::Owned => "id, doc",
    }
}

fn bind_key<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    key: RecordKey,
) -> Result<Query<'q, Sqlite, SqliteArguments<'q>>, RepositoryError> {
    Ok(match key {
        RecordKey::Id(id) => query.bind(id),
        // Composite keys are stored as their canonical JSON encoding.
        RecordKey::Pair(pair) => query.bind(serde_json::to_string(&pair)?),
    })
}

fn decode_row(spec: &TableSpec, row: &sqlx::sqlite::SqliteRow) -> Result<Value, RepositoryError> {
    let raw: String = row.try_get("doc")?;
    let mut document: Value = serde_json::from_str(&raw)?;
    if spec.key_shape != KeyShape::Composite {
        let id: i64 = row.try_get("id")?;
        let id = RecordId::try_from(id)
            .map_err(|_| RepositoryError::invalid_document(format!("identity {} out of range", id)))?;
        document::stamp_id(&mut document, id)?;
    }
    Ok(document)
}
