// Server module - HTTP server setup and routing
pub mod auth;
pub mod handlers;
pub mod state;

use std::net::SocketAddr;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::ServerError;

pub use self::auth::Caller;
pub use self::state::AppState;

/// Path every denied migration request is redirected to.
pub const UNAUTHORIZED_PATH: &str = "/Error/Unauthorized";

/// Create the Axum application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/migration", get(handlers::migration_status))
        .route("/migration/import", post(handlers::import))
        .route("/health", get(handlers::health_check))
        .layer(middleware::from_fn_with_state(state.clone(), auth::authenticate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server on the specified address until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    info!("Server listening on {}", addr);
    info!("- Migration status: http://{}/migration", addr);
    info!("- Migration import: http://{}/migration/import?fileName=<file>", addr);
    info!("- Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
