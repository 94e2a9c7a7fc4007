// Migration executor - orchestrates the embedded to PostgreSQL migration
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use garage_repository::{EmbeddedStore, PostgresStore, RecordSource, RepositoryError};
use garage_shared::EntityKind;
use sqlx::Row;
use tracing::{error, info, warn};

use crate::{MigrationError, MigrationReport, MigrationState};

/// Advisory lock key held for the duration of the copy transaction.
pub const MIGRATION_LOCK_KEY: i64 = 0x6761_7261_6765;

/// Migration executor that copies every record kind into the relational store.
pub struct MigrationExecutor {
    target: PostgresStore,
    state: Mutex<MigrationState>,
}

impl MigrationExecutor {
    pub fn new(target: PostgresStore) -> Self {
        Self {
            target,
            state: Mutex::new(MigrationState::Idle),
        }
    }

    /// State of the current or most recent run.
    pub fn state(&self) -> MigrationState {
        self.state
            .lock()
            .map(|state| *state)
            .unwrap_or(MigrationState::Failed)
    }

    fn set_state(&self, next: MigrationState) {
        if let Ok(mut state) = self.state.lock() {
            info!(from = %*state, to = %next, "Migration state");
            *state = next;
        }
    }

    /// Refuses to go further unless the relational backend answers.
    pub async fn ensure_ready(&self) -> Result<(), MigrationError> {
        self.target
            .ensure_reachable()
            .await
            .map_err(|e| MigrationError::unauthorized(e.to_string()))
    }

    /// Migrates the embedded store at `path`.
    ///
    /// The target is checked before the file is opened, and the file is opened
    /// read-only and closed again before returning.
    pub async fn import_file(&self, path: &Path) -> Result<MigrationReport, MigrationError> {
        let result = self.import_file_inner(path).await;
        self.finish(result)
    }

    async fn import_file_inner(&self, path: &Path) -> Result<MigrationReport, MigrationError> {
        self.ensure_ready().await?;
        let source = EmbeddedStore::open_read_only(path)
            .await
            .map_err(MigrationError::SourceUnavailable)?;
        info!(path = %source.path().display(), "Opened migration source");

        let result = self.migrate(&source).await;
        source.close().await;
        result
    }

    /// Migrates everything readable from `source`.
    pub async fn execute<S: RecordSource>(&self, source: &S) -> Result<MigrationReport, MigrationError> {
        let result = match self.ensure_ready().await {
            Ok(()) => self.migrate(source).await,
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    /// Logs the outcome with full detail and records the terminal state.
    fn finish(
        &self,
        result: Result<MigrationReport, MigrationError>,
    ) -> Result<MigrationReport, MigrationError> {
        match &result {
            Ok(report) => {
                self.set_state(MigrationState::Done);
                info!(
                    records = report.total(),
                    elapsed_secs = report.elapsed().as_secs_f64(),
                    "{}",
                    report.summary()
                );
            }
            Err(e) => {
                self.set_state(MigrationState::Failed);
                error!(error = %e, detail = ?e, "Migration failed");
            }
        }
        result
    }

    async fn migrate<S: RecordSource>(&self, source: &S) -> Result<MigrationReport, MigrationError> {
        let start_time = Instant::now();
        self.set_state(MigrationState::Idle);

        info!("Initializing relational schema");
        self.target.schema().initialize().await?;
        self.set_state(MigrationState::SchemaReady);

        let mut tx = self.target.pool().begin().await.map_err(MigrationError::storage)?;

        let locked: bool = sqlx::query("SELECT pg_try_advisory_xact_lock($1) AS locked")
            .bind(MIGRATION_LOCK_KEY)
            .fetch_one(&mut *tx)
            .await
            .and_then(|row| row.try_get("locked"))
            .map_err(MigrationError::storage)?;
        if !locked {
            return Err(MigrationError::MigrationInProgress);
        }

        let mut report = MigrationReport::new();
        for (index, kind) in EntityKind::ALL.iter().enumerate() {
            self.set_state(MigrationState::Copying(index));
            match self.copy_kind(*kind, source, &mut tx).await {
                Ok(count) => {
                    info!(kind = %kind, table = kind.table(), count, "Copied records");
                    report.record(*kind, count);
                }
                Err(e) => {
                    if let Err(rollback) = tx.rollback().await {
                        warn!(error = %rollback, "Rollback after failed copy did not complete");
                    }
                    return Err(MigrationError::copy_failed(*kind, e));
                }
            }
        }

        tx.commit().await.map_err(MigrationError::storage)?;
        Ok(report.finish(start_time.elapsed()))
    }

    /// Copies every stored document of `kind` unchanged, each at its original key.
    async fn copy_kind<S: RecordSource>(
        &self,
        kind: EntityKind,
        source: &S,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<usize, RepositoryError> {
        let documents = source.read_documents(kind).await?;
        for document in &documents {
            self.target.insert_document_tx(kind, document, tx).await?;
        }
        self.target.reset_identity_tx(kind, tx).await?;
        Ok(documents.len())
    }
}
