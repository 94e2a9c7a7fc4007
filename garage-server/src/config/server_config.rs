//! Environment-driven server configuration.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::ServerError;

/// Default listen address.
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Default directory searched for import files.
const DEFAULT_IMPORT_DIR: &str = "data/imports";

/// Default PostgreSQL pool size.
const DEFAULT_PG_MAX_CONNECTIONS: u32 = 5;

/// Default time to wait for a PostgreSQL connection, in seconds.
const DEFAULT_PG_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// PostgreSQL connection string. `None` means no relational backend is
    /// configured and the migration endpoints deny access.
    pub postgres_connection: Option<String>,
    pub listen_addr: SocketAddr,
    pub import_dir: PathBuf,
    /// Bearer token that identifies the root caller.
    pub admin_token: Option<String>,
    pub pg_max_connections: u32,
    pub pg_acquire_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            postgres_connection: None,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            import_dir: PathBuf::from(DEFAULT_IMPORT_DIR),
            admin_token: None,
            pg_max_connections: DEFAULT_PG_MAX_CONNECTIONS,
            pg_acquire_timeout: Duration::from_secs(DEFAULT_PG_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `POSTGRES_CONNECTION`: PostgreSQL connection string (unset: not configured)
    /// - `LISTEN_ADDR`: Socket address to bind (default: 127.0.0.1:8080)
    /// - `IMPORT_DIR`: Directory holding import files (default: data/imports)
    /// - `MIGRATION_ADMIN_TOKEN`: Bearer token granting the root role (unset: no token auth)
    /// - `PG_MAX_CONNECTIONS`: Pool size (default: 5)
    /// - `PG_ACQUIRE_TIMEOUT_SECS`: Connection acquire timeout (default: 5)
    ///
    /// # Returns
    ///
    /// * `Ok(ServerConfig)` - Parsed configuration
    /// * `Err(ServerError)` - If `LISTEN_ADDR` is not a valid socket address
    pub fn from_env() -> Result<Self, ServerError> {
        let postgres_connection = non_empty_var("POSTGRES_CONNECTION");
        let listen_addr = env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ServerError::config(format!("Invalid LISTEN_ADDR: {}", e)))?;
        let import_dir = env::var("IMPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_IMPORT_DIR));
        let admin_token = non_empty_var("MIGRATION_ADMIN_TOKEN");
        let pg_max_connections = parsed_var("PG_MAX_CONNECTIONS", DEFAULT_PG_MAX_CONNECTIONS);
        let pg_acquire_timeout = Duration::from_secs(parsed_var(
            "PG_ACQUIRE_TIMEOUT_SECS",
            DEFAULT_PG_ACQUIRE_TIMEOUT_SECS,
        ));

        Ok(Self {
            postgres_connection,
            listen_addr,
            import_dir,
            admin_token,
            pg_max_connections,
            pg_acquire_timeout,
        })
    }

    pub fn postgres_configured(&self) -> bool {
        self.postgres_connection.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
