// App state for Axum server
use std::sync::Arc;

use garage_migrator::MigrationExecutor;
use tokio::sync::Mutex;

use crate::files::FileResolver;

#[derive(Clone)]
pub struct AppState {
    /// Present only when a PostgreSQL backend is configured.
    pub executor: Option<Arc<MigrationExecutor>>,
    pub resolver: Arc<dyn FileResolver>,
    pub admin_token: Option<Arc<str>>,
    /// Held for the duration of an import so runs in this process never overlap.
    pub migration_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        executor: Option<Arc<MigrationExecutor>>,
        resolver: Arc<dyn FileResolver>,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            executor,
            resolver,
            admin_token: admin_token.map(Arc::from),
            migration_lock: Arc::new(Mutex::new(())),
        }
    }
}
