//! Dependency initialization and wiring for the migration server.

use std::sync::Arc;

use garage_migrator::MigrationExecutor;
use garage_repository::PostgresStore;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::files::DirectoryResolver;
use crate::server::AppState;
use crate::{ServerConfig, ServerError};

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub config: ServerConfig,
    pub state: AppState,
}

impl Dependencies {
    /// Wires the application state from `config`.
    ///
    /// The PostgreSQL pool is created lazily: a server whose database is down
    /// still starts, and its migration endpoints report the backend as
    /// unavailable.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        info!(
            listen_addr = %config.listen_addr,
            import_dir = %config.import_dir.display(),
            postgres_configured = config.postgres_configured(),
            token_auth = config.admin_token.is_some(),
            "Initializing dependencies"
        );

        let executor = match &config.postgres_connection {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.pg_max_connections)
                    .acquire_timeout(config.pg_acquire_timeout)
                    .connect_lazy(url)
                    .map_err(|e| ServerError::config(format!("Invalid POSTGRES_CONNECTION: {}", e)))?;
                Some(Arc::new(MigrationExecutor::new(PostgresStore::new(pool))))
            }
            None => {
                warn!("POSTGRES_CONNECTION is not set; migration endpoints will deny access");
                None
            }
        };

        if !config.import_dir.is_dir() {
            warn!(import_dir = %config.import_dir.display(), "Import directory does not exist");
        }

        let state = AppState::new(
            executor,
            Arc::new(DirectoryResolver::new(config.import_dir.clone())),
            config.admin_token.clone(),
        );

        Ok(Self { config, state })
    }
}
