// HTTP request handlers
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use garage_migrator::{MigrationError, GENERIC_ERROR_MESSAGE};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::auth::Caller;
use super::state::AppState;
use super::UNAUTHORIZED_PATH;

/// Result body of an import request.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationResponse {
    pub success: bool,
    pub message: String,
}

impl OperationResponse {
    fn failure() -> Self {
        Self {
            success: false,
            message: GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportParams {
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
}

fn unauthorized() -> Response {
    Redirect::to(UNAUTHORIZED_PATH).into_response()
}

fn is_root(caller: &Option<Extension<Caller>>) -> bool {
    caller.as_ref().map(|Extension(c)| c.is_root).unwrap_or(false)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Migration server is running")
}

/// Migration status endpoint - only answers when a PostgreSQL backend is configured
pub async fn migration_status(
    State(state): State<AppState>,
    caller: Option<Extension<Caller>>,
) -> Response {
    if !is_root(&caller) || state.executor.is_none() {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({ "postgresConfigured": true })),
    )
        .into_response()
}

/// Import endpoint - migrates the named embedded store file into PostgreSQL
pub async fn import(
    State(state): State<AppState>,
    caller: Option<Extension<Caller>>,
    Query(params): Query<ImportParams>,
) -> Response {
    if !is_root(&caller) {
        warn!("Import requested without root role");
        return unauthorized();
    }
    let Some(executor) = state.executor.clone() else {
        warn!("Import requested but no PostgreSQL backend is configured");
        return unauthorized();
    };
    if let Err(e) = executor.ensure_ready().await {
        error!(error = %e, "PostgreSQL backend unavailable, refusing import");
        return unauthorized();
    }

    let file_name = params.file_name.unwrap_or_default();
    let path = match state.resolver.resolve(&file_name) {
        Ok(path) => path,
        Err(e) => {
            error!(error = %e, "Could not resolve import file");
            return Json(OperationResponse::failure()).into_response();
        }
    };

    let Ok(_guard) = state.migration_lock.try_lock() else {
        warn!("Import requested while another import is running");
        return Json(OperationResponse::failure()).into_response();
    };

    info!(path = %path.display(), "Starting import");
    match executor.import_file(&path).await {
        Ok(report) => Json(OperationResponse {
            success: true,
            message: report.summary(),
        })
        .into_response(),
        Err(MigrationError::Unauthorized(_)) => unauthorized(),
        Err(e) => Json(OperationResponse {
            success: false,
            message: e.public_message().to_string(),
        })
        .into_response(),
    }
}
